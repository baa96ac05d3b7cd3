use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use serde_json::Value;

use parley_core::auth::Field;

use crate::app::{App, AppState, LoginFocus, Screen};

use super::styles;

/// Width of the text inside an input box
const FIELD_WIDTH: usize = 28;

/// Record keys never shown on the home screen
const HIDDEN_KEYS: &[&str] = &["token", "accessToken", "access_token", "password"];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    match app.screen {
        Screen::Login => render_login(frame, app),
        Screen::Home => render_home(frame, app, chunks[1]),
    }
    render_status_bar(frame, app, chunks[2]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Parley";
    let hint = match app.screen {
        Screen::Login => "[Ctrl+G] Guest  [Esc] Quit",
        Screen::Home => "[l] Log out  [q] Quit",
    };

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = match (&app.status_message, app.state) {
        (_, AppState::SigningIn) => Span::styled(" Signing in...", styles::muted_style()),
        (Some(msg), _) => Span::styled(format!(" {}", msg), styles::error_style()),
        (None, _) => Span::styled(format!(" Server: {}", app.server_url()), styles::muted_style()),
    };

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(Line::from(status)).block(block), area);
}

// ============================================================================
// Login screen
// ============================================================================

fn render_login(frame: &mut Frame, app: &App) {
    let form = &app.form;
    let error_lines = Field::ALL
        .iter()
        .filter(|f| form.visible_error(**f).is_some())
        .count() as u16
        + u16::from(form.submit_error().is_some()) * 2;
    let area = centered_rect_fixed(48, 12 + error_lines, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(Span::styled("          Sign in to Parley", styles::title_style())),
        Line::from(""),
    ];

    let email_display = form.email().to_string();
    push_field(&mut lines, app, Field::Email, "   Email: [", email_display);

    let password_masked = "*".repeat(form.password().chars().count());
    push_field(&mut lines, app, Field::Password, "Password: [", password_masked);

    lines.push(Line::from(""));
    let signing_in = app.state == AppState::SigningIn;
    let sign_in_label = if signing_in { " Signing in " } else { "  Sign in  " };
    lines.push(Line::from(vec![
        Span::raw("      "),
        button(sign_in_label, app.login_focus == LoginFocus::Button),
        Span::raw("   "),
        button("  Guest  ", app.login_focus == LoginFocus::Guest),
    ]));

    if let Some(error) = form.submit_error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn push_field(lines: &mut Vec<Line<'static>>, app: &App, field: Field, label: &'static str, value: String) {
    let focused = app.login_focus.field() == Some(field);
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };

    lines.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(label, styles::muted_style()),
        Span::styled(
            format!("{:<width$}{}", tail(&value, FIELD_WIDTH), cursor, width = FIELD_WIDTH),
            style,
        ),
        Span::styled("]", styles::muted_style()),
    ]));

    if let Some(error) = app.form.visible_error(field) {
        lines.push(Line::from(vec![
            Span::raw("             "),
            Span::styled(error.to_string(), styles::error_style()),
        ]));
    }
}

fn button(label: &'static str, focused: bool) -> Span<'static> {
    if focused {
        Span::styled(format!("▶{}◀", label), styles::selected_style())
    } else {
        Span::styled(format!("[{}]", label), styles::list_item_style())
    }
}

/// Last `width` characters, so the cursor end of a long value stays visible
fn tail(value: &str, width: usize) -> String {
    let count = value.chars().count();
    value.chars().skip(count.saturating_sub(width)).collect()
}

// ============================================================================
// Home screen
// ============================================================================

fn render_home(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.session.snapshot();

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Signed in as "),
            Span::styled(app.current_user_name(), styles::success_style()),
        ]),
    ];

    if let Some(since) = state.since {
        lines.push(Line::from(Span::styled(
            format!("  since {}", since.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
            styles::muted_style(),
        )));
    }

    if let Some(user) = state.user {
        lines.push(Line::from(""));
        for (key, value) in user.as_map() {
            if HIDDEN_KEYS.contains(&key.as_str()) {
                continue;
            }
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<16}", key), styles::muted_style()),
                Span::styled(display_value(value), styles::list_item_style()),
            ]));
        }
    }

    let block = Block::default()
        .title(" Session ")
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tail_keeps_end_of_long_values() {
        assert_eq!(tail("short", 10), "short");
        assert_eq!(tail("abcdefghij", 4), "ghij");
        assert_eq!(tail("ééé", 2), "éé");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&json!("ada")), "ada");
        assert_eq!(display_value(&json!(null)), "-");
        assert_eq!(display_value(&json!(3)), "3");
        assert_eq!(display_value(&json!(["a"])), "[\"a\"]");
    }

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(48, 14, area);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect_fixed(20, 4, Rect::new(0, 0, 40, 10));
        assert_eq!(rect, Rect::new(10, 3, 20, 4));
    }
}
