//! Application state management for the Parley terminal client.
//!
//! This module contains the `App` struct that owns the login form, the
//! login flow, and which screen is showing. The session itself lives in the
//! shared `SessionContext` so other parts of the client can observe it.

use anyhow::Result;
use tracing::{debug, info, warn};

use parley_core::auth::Field;
use parley_core::{
    ApiClient, Config, LocalStore, LoginFlow, LoginForm, LoginOutcome, SessionContext, ROOT_ROUTE,
};

// ============================================================================
// Screens and focus
// ============================================================================

/// Screen currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    /// The application root
    Home,
}

impl Screen {
    pub fn from_route(route: &str) -> Self {
        if route == ROOT_ROUTE {
            Screen::Home
        } else {
            Screen::Login
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    /// A login request has been queued and runs after the next draw
    SigningIn,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
    Guest,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Guest,
            LoginFocus::Guest => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Guest,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::Guest => LoginFocus::Button,
        }
    }

    /// The form field behind this focus, if it is a text input
    pub fn field(&self) -> Option<Field> {
        match self {
            LoginFocus::Email => Some(Field::Email),
            LoginFocus::Password => Some(Field::Password),
            LoginFocus::Button | LoginFocus::Guest => None,
        }
    }

    fn for_field(field: Field) -> Self {
        match field {
            Field::Email => LoginFocus::Email,
            Field::Password => LoginFocus::Password,
        }
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    pub flow: LoginFlow,
    pub session: SessionContext,

    pub screen: Screen,
    pub state: AppState,

    // Login form state
    pub form: LoginForm,
    pub login_focus: LoginFocus,

    pub status_message: Option<String>,

    /// Skip writing the config file (tests, read-only setups)
    persist_config: bool,
}

impl App {
    /// Create a new application instance from configuration
    pub fn new(config: Config) -> Result<Self> {
        let server_url = config.server_url();
        let data_dir = config.data_dir()?;
        debug!(%server_url, ?data_dir, "Configured");

        let session = SessionContext::new();
        let flow = LoginFlow::new(
            ApiClient::new(server_url)?,
            LocalStore::new(data_dir),
            session.clone(),
        );

        Ok(Self::with_flow(config, flow, true))
    }

    pub fn with_flow(config: Config, flow: LoginFlow, persist_config: bool) -> Self {
        let form = match config.initial_email() {
            Some(email) => LoginForm::with_email(email),
            None => LoginForm::new(),
        };
        let session = flow.context().clone();

        let mut app = Self {
            config,
            flow,
            session,
            screen: Screen::Login,
            state: AppState::Normal,
            form,
            login_focus: LoginFocus::Email,
            status_message: None,
            persist_config,
        };
        app.login_focus = app.initial_focus();
        app
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Pick up a stored session and show the matching screen
    pub fn start(&mut self) {
        if self.flow.restore() {
            self.navigate(ROOT_ROUTE);
        } else {
            self.start_login();
        }
    }

    pub fn navigate(&mut self, route: &str) {
        debug!(route, "Navigating");
        self.screen = Screen::from_route(route);
        if self.screen == Screen::Login {
            self.login_focus = self.initial_focus();
        }
    }

    /// Show the login form
    pub fn start_login(&mut self) {
        self.screen = Screen::Login;
        self.state = AppState::Normal;
        self.login_focus = self.initial_focus();
    }

    fn initial_focus(&self) -> LoginFocus {
        if self.form.email().is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        }
    }

    /// Move focus, marking the field being left as touched
    pub fn set_login_focus(&mut self, focus: LoginFocus) {
        if let Some(field) = self.login_focus.field() {
            if focus != self.login_focus {
                self.form.blur(field);
            }
        }
        self.login_focus = focus;
    }

    /// Queue a login; the main loop runs it after redrawing
    pub fn request_login(&mut self) {
        if self.state == AppState::Normal {
            self.state = AppState::SigningIn;
        }
    }

    pub fn login_requested(&self) -> bool {
        self.state == AppState::SigningIn
    }

    /// Run the login flow with the form contents
    pub async fn attempt_login(&mut self) {
        let outcome = self.flow.login(&mut self.form).await;
        if self.state == AppState::SigningIn {
            self.state = AppState::Normal;
        }

        match outcome {
            LoginOutcome::Redirect(route) => {
                self.remember_email();
                self.status_message = None;
                self.navigate(route);
            }
            LoginOutcome::Invalid(errors) => {
                if let Some((field, _)) = errors.iter().next() {
                    self.login_focus = LoginFocus::for_field(field);
                }
            }
            LoginOutcome::Failed(_) => {
                self.login_focus = LoginFocus::Password;
            }
        }
    }

    /// Guest credential action
    pub fn use_guest_credentials(&mut self) {
        self.form.fill_guest();
        self.login_focus = LoginFocus::Button;
    }

    pub fn logout(&mut self) {
        match self.flow.logout() {
            Ok(route) => {
                self.status_message = None;
                self.navigate(route);
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear stored session");
                self.status_message = Some(format!("Logged out, but {}", e));
                self.start_login();
            }
        }
    }

    fn remember_email(&mut self) {
        let email = self.form.email().to_string();
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if self.persist_config {
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
        info!("Remembered login email");
    }

    // =========================================================================
    // Display helpers
    // =========================================================================

    /// Name of the signed-in user for the home screen
    pub fn current_user_name(&self) -> String {
        self.session
            .user()
            .and_then(|u| u.display_name().map(String::from))
            .unwrap_or_else(|| "unknown user".to_string())
    }

    pub fn server_url(&self) -> String {
        self.config.server_url()
    }
}

// ============================================================================
// Tests
// ============================================================================
