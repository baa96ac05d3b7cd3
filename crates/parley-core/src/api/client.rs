//! API client for the Parley chat backend.
//!
//! This module provides the `ApiClient` struct, which posts credentials to
//! the backend's auth endpoint and decodes the session record it returns.

use std::time::Duration;

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::Credentials;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path of the login endpoint, relative to the server URL
pub const LOGIN_PATH: &str = "/api/auth/login";

/// HTTP request timeout in seconds.
/// A login round trip is small; 30s still covers a cold backend.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Session record returned by the auth endpoint.
///
/// The backend owns the shape of this object, so it is kept as raw JSON and
/// persisted exactly as received. Accessors cover the handful of fields the
/// client displays or forwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginResponse(Map<String, Value>);

impl LoginResponse {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Bearer token, if the backend included one
    pub fn token(&self) -> Option<&str> {
        self.first_str(&["token", "accessToken", "access_token"])
    }

    /// Best available name for display: name, then username, then email
    pub fn display_name(&self) -> Option<&str> {
        self.first_str(&["name", "username", "email"])
    }

    pub fn email(&self) -> Option<&str> {
        self.first_str(&["email"])
    }

    fn first_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.0.get(*k).and_then(Value::as_str))
            .find(|s| !s.is_empty())
    }
}

/// API client for the chat backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client for the given server URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchange credentials for a session record
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(LOGIN_PATH);
        debug!(url = %url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
