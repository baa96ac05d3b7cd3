//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Submitting the login form only queues the
//! request; the main loop runs it so the "signing in" state gets drawn.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, LoginFocus, Screen};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Ignore keys while a login request is pending
    if app.state == AppState::SigningIn {
        return false;
    }

    match app.screen {
        Screen::Login => handle_login_input(app, key),
        Screen::Home => handle_home_input(app, key),
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('g') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.use_guest_credentials();
        return false;
    }

    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.set_login_focus(app.login_focus.next());
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.set_login_focus(app.login_focus.prev());
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email | LoginFocus::Password => {
                app.set_login_focus(app.login_focus.next());
            }
            LoginFocus::Button => app.request_login(),
            LoginFocus::Guest => app.use_guest_credentials(),
        },
        KeyCode::Backspace => {
            if let Some(field) = app.login_focus.field() {
                app.form.pop_char(field);
            }
        }
        KeyCode::Char(c) => {
            // Character input on the buttons is ignored
            if let Some(field) = app.login_focus.field() {
                app.form.push_char(field, c);
            }
        }
        _ => {}
    }
    false
}

fn handle_home_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.state = AppState::Quitting;
            true
        }
        KeyCode::Char('l') => {
            app.logout();
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::auth::{Field, GUEST_EMAIL};
    use parley_core::{ApiClient, Config, LocalStore, LoginFlow, SessionContext, SESSION_KEY};
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        let flow = LoginFlow::new(
            ApiClient::new("http://127.0.0.1:9").unwrap(),
            LocalStore::new(dir.path().to_path_buf()),
            SessionContext::new(),
        );
        let mut app = App::with_flow(Config::default(), flow, false);
        // Start from a known field regardless of PARLEY_EMAIL
        app.login_focus = LoginFocus::Email;
        app
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_typing_fills_focused_field() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let existing = app.form.email().to_string();

        type_str(&mut app, "x@y.io");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "pw");
        press(&mut app, KeyCode::Backspace);

        assert_eq!(app.form.email(), format!("{existing}x@y.io"));
        assert_eq!(app.form.password(), "p");
        assert_eq!(app.login_focus, LoginFocus::Password);
    }

    #[test]
    fn test_enter_moves_through_fields_then_submits() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.login_focus, LoginFocus::Password);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.login_focus, LoginFocus::Button);
        assert!(!app.login_requested());

        press(&mut app, KeyCode::Enter);
        assert!(app.login_requested());

        // Further keys are ignored until the request finishes
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.login_focus, LoginFocus::Button);
    }

    #[test]
    fn test_ctrl_g_fills_guest_credentials() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        handle_input(&mut app, KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));

        assert_eq!(app.form.email(), GUEST_EMAIL);
        assert!(app.form.errors().is_empty());
        assert_eq!(app.login_focus, LoginFocus::Button);
    }

    #[test]
    fn test_enter_on_guest_button() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.set_login_focus(LoginFocus::Guest);

        press(&mut app, KeyCode::Enter);

        assert_eq!(app.form.email(), GUEST_EMAIL);
        assert!(!app.login_requested());
    }

    #[test]
    fn test_characters_ignored_on_buttons() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.set_login_focus(LoginFocus::Button);
        let before = app.form.email().to_string();

        type_str(&mut app, "abc");

        assert_eq!(app.form.email(), before);
        assert_eq!(app.form.password(), "");
        assert!(app.form.is_touched(Field::Email));
    }

    #[test]
    fn test_escape_quits_from_login() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        assert!(press(&mut app, KeyCode::Esc));
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_home_logout_key() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.flow.store().set_item(SESSION_KEY, "{}").unwrap();
        app.start();
        assert_eq!(app.screen, Screen::Home);

        assert!(!press(&mut app, KeyCode::Char('l')));

        assert_eq!(app.screen, Screen::Login);
        assert!(!app.is_authenticated());
    }
}
