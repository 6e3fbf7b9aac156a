//! Command implementations behind the `pantry` binary.
//!
//! Each command performs one operation against the service and renders the
//! outcome. Failures are reported once and never retried.

mod account;
mod meals;
mod pantry;
mod watch;

use std::path::PathBuf;

pub use account::{login, logout, register, whoami, LoginArgs, RegisterArgs};
pub use meals::{cook, meals, suggest};
pub use pantry::{add_item, create_pantry, items, pantries, AddItemArgs};
pub use watch::watch;

use crate::api::{ApiClient, ApiError};
use crate::auth::{Session, StorageError, TokenStore};
use crate::config::{ClientConfig, ConfigError, ConfigLoader};

/// Errors surfaced to the user by a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The service no longer accepts the stored token.
    #[error("{0}; log in again with `pantry login`")]
    SessionRejected(#[source] ApiError),

    #[error("{0}")]
    Invalid(String),
}

impl CommandError {
    /// Map a failed identity lookup, flagging a rejected token.
    fn from_identity_check(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::SessionRejected(err)
        } else {
            Self::Api(err)
        }
    }
}

/// Configuration and storage shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ClientConfig,
    pub store: TokenStore,
}

impl Context {
    /// Load configuration, applying CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn load(
        config_path: Option<PathBuf>,
        api_url: Option<String>,
    ) -> Result<Self, CommandError> {
        let loader = config_path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
        let mut config = loader.load()?;
        if let Some(url) = api_url {
            config.api_base_url = url;
        }
        Ok(Self::new(config))
    }

    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let store = TokenStore::new(config.token_file());
        Self { config, store }
    }

    /// API client without credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built from the configuration.
    pub fn anonymous_client(&self) -> Result<ApiClient, CommandError> {
        Ok(ApiClient::new(&self.config)?)
    }

    /// API client carrying the stored bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` if no token is stored.
    pub fn client(&self) -> Result<ApiClient, CommandError> {
        let token = self.store.load()?.ok_or(ApiError::MissingToken)?;
        Ok(self.anonymous_client()?.with_token(token))
    }

    /// Resolve the stored token into a session.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is stored or the service rejects it.
    pub async fn session(&self) -> Result<Session, CommandError> {
        let token = self.store.load()?.ok_or(ApiError::MissingToken)?;
        let client = self.anonymous_client()?.with_token(token.clone());
        let user = client
            .current_user()
            .await
            .map_err(CommandError::from_identity_check)?;
        Ok(Session::new(user, token))
    }
}
