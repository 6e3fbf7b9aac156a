//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;

/// Name of the directory used under the platform config and data dirs.
pub const APP_DIR_NAME: &str = "pantry-client";

/// File name of the client-local storage file.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Configuration for talking to the pantry service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the HTTP API.
    pub api_base_url: String,
    /// Explicit push channel URL. Derived from `api_base_url` when unset.
    pub push_url: Option<String>,
    /// Connection timeout for HTTP requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall request timeout for HTTP requests, in seconds.
    pub request_timeout_secs: u64,
    /// Where the bearer token is kept. Defaults to the platform data dir.
    pub token_path: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            push_url: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            token_path: None,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Path of the file holding the bearer token.
    ///
    /// Falls back to the working directory when the platform has no data dir.
    #[must_use]
    pub fn token_file(&self) -> PathBuf {
        if let Some(path) = &self.token_path {
            return path.clone();
        }
        dirs::data_local_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(STORAGE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}-{STORAGE_FILE_NAME}")))
    }

    /// Build the push channel URL for the given bearer token.
    ///
    /// Without an explicit `push_url`, the scheme of the API base URL is mapped
    /// to its websocket counterpart and `ws` is appended to its path, so
    /// `https://host/api` yields `wss://host/api/ws`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if either URL cannot be parsed or the
    /// base URL uses a scheme with no websocket counterpart.
    pub fn push_url_for(&self, token: &str) -> Result<Url, ConfigError> {
        let mut url = match &self.push_url {
            Some(explicit) => Url::parse(explicit).map_err(|e| ConfigError::InvalidUrl {
                url: explicit.clone(),
                reason: e.to_string(),
            })?,
            None => {
                let mut base =
                    Url::parse(&self.api_base_url).map_err(|e| ConfigError::InvalidUrl {
                        url: self.api_base_url.clone(),
                        reason: e.to_string(),
                    })?;
                let scheme = match base.scheme() {
                    "http" | "ws" => "ws",
                    "https" | "wss" => "wss",
                    other => {
                        return Err(ConfigError::InvalidUrl {
                            url: self.api_base_url.clone(),
                            reason: format!("unsupported scheme {other}"),
                        })
                    }
                };
                base.set_scheme(scheme)
                    .map_err(|()| ConfigError::InvalidUrl {
                        url: self.api_base_url.clone(),
                        reason: "cannot switch to websocket scheme".to_string(),
                    })?;
                let path = format!("{}/ws", base.path().trim_end_matches('/'));
                base.set_path(&path);
                base.set_query(None);
                base
            }
        };
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }
}
