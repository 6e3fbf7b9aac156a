//! State exposed by the channel manager.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::ProactiveMealDisplayData;

/// Push channel connection status as shown to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    #[default]
    Disconnected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a view needs to render proactive suggestions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    /// Last successfully fetched snapshot.
    pub latest_snapshot: Option<ProactiveMealDisplayData>,
    pub status: ConnectionStatus,
    /// A snapshot fetch of the current activation is in flight.
    pub loading: bool,
    /// Message of the most recent failed fetch, cleared when a fetch starts.
    pub last_error: Option<String>,
    pub(crate) epoch: u64,
    pub(crate) pending_fetches: usize,
}

impl NotificationState {
    /// Begin a new activation: status `connecting`, fetch bookkeeping reset.
    pub(crate) fn activate(&mut self) -> u64 {
        self.epoch += 1;
        self.latest_snapshot = None;
        self.status = ConnectionStatus::Connecting;
        self.loading = false;
        self.last_error = None;
        self.pending_fetches = 0;
        self.epoch
    }

    /// End the current activation; results still in flight will be discarded.
    pub(crate) fn deactivate(&mut self) {
        self.epoch += 1;
        self.latest_snapshot = None;
        self.status = ConnectionStatus::Disconnected;
        self.loading = false;
        self.pending_fetches = 0;
    }

    /// Record the start of a fetch. Returns false for a stale activation.
    pub(crate) fn begin_fetch(&mut self, epoch: u64) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.pending_fetches += 1;
        self.loading = true;
        self.last_error = None;
        true
    }

    /// Apply a fetch outcome. Returns false for a stale activation.
    pub(crate) fn finish_fetch(
        &mut self,
        epoch: u64,
        outcome: Result<ProactiveMealDisplayData, String>,
    ) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.pending_fetches = self.pending_fetches.saturating_sub(1);
        self.loading = self.pending_fetches > 0;
        match outcome {
            Ok(snapshot) => self.latest_snapshot = Some(snapshot),
            Err(message) => self.last_error = Some(message),
        }
        true
    }

    /// Move to `connected`, only from `connecting` within the same activation.
    pub(crate) fn mark_connected(&mut self, epoch: u64) -> bool {
        if self.epoch != epoch || self.status != ConnectionStatus::Connecting {
            return false;
        }
        self.status = ConnectionStatus::Connected;
        true
    }

    /// The channel went away on its own; the snapshot is kept.
    pub(crate) fn mark_disconnected(&mut self, epoch: u64) -> bool {
        if self.epoch != epoch || self.status == ConnectionStatus::Disconnected {
            return false;
        }
        self.status = ConnectionStatus::Disconnected;
        true
    }
}
