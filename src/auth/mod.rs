//! Session state and bearer token storage.

mod session;
mod token;

pub use session::{Session, SessionHolder};
pub use token::{BearerToken, StorageError, TokenStore, TOKEN_KEY};
