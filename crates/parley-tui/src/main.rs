//! Parley - terminal sign-in for the Parley chat service.
//!
//! Runs the login form in the terminal, or signs in headlessly with
//! `parley login`. Either way the session ends up in the same client
//! storage the rest of the client reads.

mod app;
mod ui;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use parley_core::auth::Field;
use parley_core::Config;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name in the data directory
const LOG_FILE: &str = "parley.log";

const USAGE: &str = "\
Usage: parley [COMMAND] [OPTIONS]

Commands:
  login     Sign in from the command line
  logout    Forget the stored session

Options:
  --guest   Start with the demo credentials filled in
  -h, --help  Show this help";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a file in the data
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if std::fs::create_dir_all(log_dir).is_err() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring unreadable config: {}", e);
        Config::default()
    });

    let data_dir = config.data_dir()?;
    let _guard = init_tracing(&data_dir);
    info!("Parley starting");

    let mut app = App::new(config)?;

    match args.first().map(String::as_str) {
        Some("login") => return login_headless(&mut app).await,
        Some("logout") => {
            app.flow.logout().context("Failed to clear stored session")?;
            println!("Logged out.");
            return Ok(());
        }
        Some("--guest") | None => {}
        Some(other) => anyhow::bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }

    app.start();
    if args.iter().any(|a| a == "--guest") && !app.is_authenticated() {
        app.use_guest_credentials();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Parley shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // A queued login runs after the frame above showed it as pending
        if app.login_requested() {
            app.attempt_login().await;
            continue;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Prompt for credentials on the terminal and run the login flow once
async fn login_headless(app: &mut App) -> Result<()> {
    println!("\n=== Parley Login ({}) ===\n", app.server_url());

    let mut form = app.form.clone();
    let email = prompt_email(form.email())?;
    form.set_email(&email);
    let password = rpassword::prompt_password("Password: ")?;
    form.set_password(&password);

    app.form = form;
    app.attempt_login().await;

    if app.is_authenticated() {
        println!("Signed in as {}.", app.current_user_name());
        return Ok(());
    }

    for field in Field::ALL {
        if let Some(msg) = app.form.visible_error(field) {
            eprintln!("{}: {}", field.label(), msg);
        }
    }
    if let Some(msg) = app.form.submit_error() {
        eprintln!("{}", msg);
    }
    anyhow::bail!("Login failed")
}

fn prompt_email(remembered: &str) -> Result<String> {
    if remembered.is_empty() {
        print!("Email: ");
    } else {
        print!("Email [{}]: ", remembered);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.is_empty() {
        Ok(remembered.to_string())
    } else {
        Ok(input.to_string())
    }
}
