//! Persistent client-side key-value storage.
//!
//! `LocalStore` keeps string values under string keys in a single JSON file,
//! the terminal counterpart of browser local storage. Every call goes to
//! disk, so separate instances pointed at the same directory agree.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

/// Key holding the serialized login response
pub const SESSION_KEY: &str = "userInfo";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read storage file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write storage file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("Storage file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Value stored under '{key}' is not valid: {source}")]
    InvalidValue {
        key: String,
        source: serde_json::Error,
    },
}

pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_FILE)
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_for_update()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)?;
        debug!(key, "Stored item");
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_for_update()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
            debug!(key, "Removed item");
        }
        Ok(())
    }

    /// Drop every key, leaving an empty but readable file
    pub fn clear(&self) -> Result<(), StorageError> {
        self.write_all(&BTreeMap::new())?;
        debug!("Cleared storage");
        Ok(())
    }

    /// Read a key and decode its value as JSON
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get_item(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::InvalidValue {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Serialize a value to JSON and store it under a key
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::InvalidValue {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &raw)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let path = self.path();
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt { path, source })
    }

    /// Current items for a write. An unreadable file is replaced, not kept.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.read_all() {
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(error = %e, "Replacing corrupt storage file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    /// Write through a temp file so a crash never leaves half a file behind
    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let path = self.path();
        let write_err = |source| StorageError::Write {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(write_err)?;

        let contents = serde_json::to_string_pretty(items).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(write_err)?;
        std::fs::rename(&tmp, &path).map_err(write_err)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));
        assert_eq!(store.get_item(SESSION_KEY).unwrap(), None);
        // Removing from an empty store does not create the file
        store.remove_item(SESSION_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("nested"));

        store.set_item("theme", "dark").unwrap();
        store.set_item(SESSION_KEY, "{}").unwrap();
        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("dark"));

        store.remove_item(SESSION_KEY).unwrap();
        assert_eq!(store.get_item(SESSION_KEY).unwrap(), None);
        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        LocalStore::new(dir.path().to_path_buf())
            .set_json(SESSION_KEY, &json!({ "name": "ada" }))
            .unwrap();

        let reopened = LocalStore::new(dir.path().to_path_buf());
        let value: Option<serde_json::Value> = reopened.get_json(SESSION_KEY).unwrap();
        assert_eq!(value, Some(json!({ "name": "ada" })));
    }

    #[test]
    fn test_invalid_value() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        store.set_item(SESSION_KEY, "not json").unwrap();

        let err = store.get_json::<serde_json::Value>(SESSION_KEY).unwrap_err();
        assert!(matches!(err, StorageError::InvalidValue { ref key, .. } if key == SESSION_KEY));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), "{ truncated").unwrap();

        assert!(matches!(store.get_item(SESSION_KEY), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), "{ truncated").unwrap();

        store.set_item("theme", "dark").unwrap();
        assert_eq!(store.get_item("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), "{ truncated").unwrap();

        store.clear().unwrap();
        assert_eq!(store.get_item(SESSION_KEY).unwrap(), None);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{}");
    }

    #[test]
    fn test_session_stored_under_user_info_key() {
        assert_eq!(SESSION_KEY, "userInfo");

        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().to_path_buf());
        store.set_json(SESSION_KEY, &json!({ "name": "ada" })).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["userInfo"], json!(r#"{"name":"ada"}"#));
    }
}
