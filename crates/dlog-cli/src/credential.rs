//! Stored API-key credential management.
//!
//! The key lives in `credentials.json` under the config directory. Every
//! operation catches its own I/O failures: `save`/`clear` report success
//! as a bool, `load` reports absence as `None`. Nothing here propagates
//! an error to the analysis flow.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Credential file contents.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    api_key: String,
}

/// File-backed store for the Claude API key.
#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    path: PathBuf,
}

impl ApiKeyStore {
    /// Store at the default location (`<config dir>/dlog/credentials.json`).
    ///
    /// Returns `None` when no config directory can be determined.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        crate::config::dirs_config_path().map(|dir| Self {
            path: dir.join("credentials.json"),
        })
    }

    /// Store at a specific path.
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Saves the key, reporting success.
    #[must_use]
    pub fn save(&self, key: &str) -> bool {
        match self.try_save(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to save API key");
                false
            }
        }
    }

    /// Loads the stored key, `None` when absent or unreadable.
    #[must_use]
    pub fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<StoredCredential>(&content) {
                Ok(credential) => Some(credential.api_key),
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "malformed credential file");
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read credential file");
                None
            }
        }
    }

    /// Removes the stored key, reporting success. Removing a key that was
    /// never stored counts as success.
    #[must_use]
    pub fn clear(&self) -> bool {
        match std::fs::remove_file(&self.path) {
            Ok(()) => true,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => true,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to clear API key");
                false
            }
        }
    }

    /// Path of the credential file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_save(&self, key: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&StoredCredential {
            api_key: key.to_string(),
        })
        .map_err(std::io::Error::other)?;
        std::fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApiKeyStore::at(dir.path().join("credentials.json"));

        assert!(store.save("sk-ant-test-key"));
        assert_eq!(store.load().as_deref(), Some("sk-ant-test-key"));
    }

    #[test]
    fn load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApiKeyStore::at(dir.path().join("credentials.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn load_malformed_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not-json").unwrap();
        let store = ApiKeyStore::at(path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_removes_stored_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApiKeyStore::at(dir.path().join("credentials.json"));

        assert!(store.save("sk-ant-test-key"));
        assert!(store.clear());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_without_stored_key_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApiKeyStore::at(dir.path().join("credentials.json"));
        assert!(store.clear());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = ApiKeyStore::at(dir.path().join("nested/deeper/credentials.json"));
        assert!(store.save("sk-ant-test-key"));
        assert_eq!(store.load().as_deref(), Some("sk-ant-test-key"));
    }
}
