//! Core library for the Parley chat client sign-in flow.
//!
//! This crate holds everything below the user interface:
//! - `auth`: credentials, the validator and the shared session context
//! - `form`: login form state (field values, touched flags, inline errors)
//! - `api`: the HTTP client for the chat backend's auth endpoint
//! - `storage`: persistent client-side key-value storage
//! - `login`: the submit handler tying the pieces together
//! - `config`: user configuration and directory resolution

pub mod api;
pub mod auth;
pub mod config;
pub mod form;
pub mod login;
pub mod storage;

pub use api::{ApiClient, ApiError, LoginResponse};
pub use auth::{Credentials, Field, SessionContext, SessionState, ValidationErrors};
pub use config::Config;
pub use form::LoginForm;
pub use login::{LoginFailure, LoginFlow, LoginOutcome, LOGIN_ROUTE, ROOT_ROUTE};
pub use storage::{LocalStore, StorageError, SESSION_KEY};
