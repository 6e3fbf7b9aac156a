//! Typed client for the pantry service HTTP API.

mod client;
mod error;
mod types;

pub use client::{ApiClient, SnapshotScope};
pub use error::ApiError;
pub use types::*;
