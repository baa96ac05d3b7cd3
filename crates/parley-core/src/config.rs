//! Application configuration management.
//!
//! This module handles loading and saving the user configuration, which
//! holds the chat server URL and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/parley/config.json`. Environment
//! variables take precedence over the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "parley";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Server used when neither the environment nor the config file names one
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

pub const SERVER_URL_ENV: &str = "PARLEY_SERVER_URL";
pub const EMAIL_ENV: &str = "PARLEY_EMAIL";
pub const DATA_DIR_ENV: &str = "PARLEY_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub server_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Server URL: environment, then config file, then the local default
    pub fn server_url(&self) -> String {
        resolve(
            std::env::var(SERVER_URL_ENV).ok(),
            self.server_url.clone(),
            DEFAULT_SERVER_URL,
        )
    }

    /// Email to pre-fill on the login form, if any
    pub fn initial_email(&self) -> Option<String> {
        std::env::var(EMAIL_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.last_email.clone())
    }

    /// Directory holding client storage and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

fn resolve(env: Option<String>, file: Option<String>, default: &str) -> String {
    env.filter(|s| !s.trim().is_empty())
        .or_else(|| file.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
}
