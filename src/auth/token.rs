//! Bearer token and its client-local storage.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Key under which the token is kept in the storage file.
pub const TOKEN_KEY: &str = "jwt";

/// Opaque bearer credential.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for headers and query strings.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(****)")
    }
}

/// Errors reading or writing the storage file.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Failed to access token storage {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Token storage {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON key/value file holding the bearer token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token. A missing file or key yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<BearerToken>, StorageError> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(BearerToken::new))
    }

    /// Store the token, keeping any other keys in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub fn save(&self, token: &BearerToken) -> Result<(), StorageError> {
        let mut entries = self.read_entries()?;
        entries.insert(TOKEN_KEY.to_string(), Value::String(token.expose().to_string()));
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), "Stored bearer token");
        Ok(())
    }

    /// Remove the token. Nothing to remove is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be rewritten.
    pub fn clear(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.read_entries()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write_entries(&entries)?;
            tracing::debug!(path = %self.path.display(), "Cleared bearer token");
        }
        Ok(())
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let content = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Corrupt {
            path: self.path.clone(),
            source: e,
        })?;
        std::fs::write(&self.path, content).map_err(io_err)
    }
}
