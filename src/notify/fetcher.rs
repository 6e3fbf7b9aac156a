//! Snapshot fetching seam for the channel manager.

use async_trait::async_trait;

use crate::api::{ApiClient, ApiError, ProactiveMealDisplayData, SnapshotScope};
use crate::auth::Session;

/// Reads the authoritative proactive suggestion snapshot.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync + 'static {
    async fn fetch_snapshot(
        &self,
        session: &Session,
        scope: SnapshotScope,
    ) -> Result<ProactiveMealDisplayData, ApiError>;
}

#[async_trait]
impl SnapshotFetcher for ApiClient {
    async fn fetch_snapshot(
        &self,
        session: &Session,
        scope: SnapshotScope,
    ) -> Result<ProactiveMealDisplayData, ApiError> {
        self.snapshot(&session.token, scope).await
    }
}
