//! Authentication module for credentials and the shared session.
//!
//! This module provides:
//! - `Credentials`: the email/password pair and its validator
//! - `SessionContext`: shared in-memory session state for the rest of the app
//!
//! Credentials are transient; the session outlives them in client storage.

pub mod context;
pub mod credentials;

pub use context::{SessionContext, SessionState};
pub use credentials::{Credentials, Field, ValidationErrors, GUEST_EMAIL, GUEST_PASSWORD};
