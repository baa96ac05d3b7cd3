//! Login submit handler and session lifecycle.
//!
//! `LoginFlow` validates the form, posts the credentials, and on success
//! writes the returned session to client storage and the shared context
//! before telling the caller where to navigate. A failed attempt leaves
//! storage and context untouched.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, LoginResponse};
use crate::auth::{Credentials, SessionContext, ValidationErrors};
use crate::form::LoginForm;
use crate::storage::{LocalStore, StorageError, SESSION_KEY};

/// Application root, the destination after a successful login
pub const ROOT_ROUTE: &str = "/";

/// Destination after logout
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Error, Debug)]
pub enum LoginFailure {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to save session: {0}")]
    Storage(#[from] StorageError),
}

impl LoginFailure {
    /// Message suitable for showing under the login form
    pub fn user_message(&self) -> String {
        match self {
            LoginFailure::Api(ApiError::Unauthorized) => "Invalid email or password".to_string(),
            LoginFailure::Api(ApiError::RateLimited) => {
                "Too many attempts. Please wait and try again.".to_string()
            }
            LoginFailure::Api(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            LoginFailure::Api(e) if e.is_connection_failure() => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            LoginFailure::Storage(_) => "Could not save your session on this device".to_string(),
            other => format!("Login failed: {}", other),
        }
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    /// The form did not validate; no request was sent
    Invalid(ValidationErrors),
    /// Session stored and published; navigate to this route
    Redirect(&'static str),
    /// The request or the session write failed; nothing was changed
    Failed(LoginFailure),
}

impl LoginOutcome {
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            LoginOutcome::Redirect(route) => Some(*route),
            _ => None,
        }
    }
}

pub struct LoginFlow {
    api: ApiClient,
    store: LocalStore,
    context: SessionContext,
}

impl LoginFlow {
    pub fn new(api: ApiClient, store: LocalStore, context: SessionContext) -> Self {
        Self { api, store, context }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Validate the form and, when valid, submit its credentials.
    /// A failure message is left on the form for display.
    pub async fn login(&self, form: &mut LoginForm) -> LoginOutcome {
        let credentials = match form.submit() {
            Ok(credentials) => credentials,
            Err(errors) => {
                debug!(fields = %errors, "Login form did not validate");
                return LoginOutcome::Invalid(errors);
            }
        };

        let outcome = self.submit(&credentials).await;
        match outcome {
            LoginOutcome::Redirect(_) => form.clear_password(),
            LoginOutcome::Failed(ref failure) => form.set_submit_error(Some(failure.user_message())),
            LoginOutcome::Invalid(_) => {}
        }
        outcome
    }

    /// Post validated credentials and publish the resulting session
    pub async fn submit(&self, credentials: &Credentials) -> LoginOutcome {
        match self.establish_session(credentials).await {
            Ok(()) => {
                info!(email = %credentials.email, "Login successful");
                LoginOutcome::Redirect(ROOT_ROUTE)
            }
            Err(failure) => {
                error!(error = %failure, "Login failed");
                LoginOutcome::Failed(failure)
            }
        }
    }

    async fn establish_session(&self, credentials: &Credentials) -> Result<(), LoginFailure> {
        let response = self.api.login(credentials).await?;

        // Persist before publishing so the context never runs ahead of storage
        self.store.set_json(SESSION_KEY, &response)?;

        self.context.sign_in(response);
        Ok(())
    }

    /// Publish a session left in storage by an earlier run.
    /// Returns true when a session was restored.
    pub fn restore(&self) -> bool {
        match self.store.get_json::<LoginResponse>(SESSION_KEY) {
            Ok(Some(user)) => {
                self.context.sign_in(user);
                debug!("Session restored from storage");
                true
            }
            Ok(None) => false,
            Err(e @ StorageError::InvalidValue { .. }) => {
                warn!(error = %e, "Discarding unreadable stored session");
                if let Err(e) = self.store.remove_item(SESSION_KEY) {
                    warn!(error = %e, "Failed to remove stored session");
                }
                false
            }
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(error = %e, "Resetting corrupt storage file");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to reset storage file");
                }
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                false
            }
        }
    }

    /// Forget the session everywhere and return the route to show next.
    /// The context is cleared even if storage cannot be updated.
    pub fn logout(&self) -> Result<&'static str, StorageError> {
        let removed = self.store.remove_item(SESSION_KEY);
        self.context.clear();
        removed?;
        info!("Logged out");
        Ok(LOGIN_ROUTE)
    }
}

// ============================================================================
// Tests
// ============================================================================
