//! REST client module for the Parley chat backend.
//!
//! This module provides the `ApiClient` used to exchange an email and
//! password for a session record at `POST /api/auth/login`.
//!
//! The session record is treated as opaque: it is stored and shared as
//! returned, with a few accessors for fields the front end displays.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse, LOGIN_PATH};
pub use error::ApiError;
