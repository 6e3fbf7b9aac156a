//! Inbound push channel signals.

use serde_json::Value;

use crate::api::{MealWindow, SnapshotScope};

/// What an inbound message asks the manager to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSignal {
    /// Something changed; re-fetch the whole snapshot.
    Refresh,
    /// One window changed; re-fetch the latest snapshot for it.
    Window(MealWindow),
}

impl ChannelSignal {
    /// The fetch this signal triggers.
    #[must_use]
    pub fn scope(self) -> SnapshotScope {
        match self {
            Self::Refresh => SnapshotScope::Current,
            Self::Window(window) => SnapshotScope::Latest(window),
        }
    }
}

/// An inbound payload that cannot be acted on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    #[error("Payload looks like JSON but does not parse: {0}")]
    InvalidJson(String),

    #[error("mealWindow must be a string, got {0}")]
    WindowNotString(String),

    #[error("Unknown mealWindow: {0}")]
    UnknownWindow(String),
}

/// Classify an inbound text message.
///
/// Objects carrying `mealWindow` name the slot that changed. Any other
/// payload is an opaque "something changed" signal.
///
/// # Errors
///
/// Returns `SignalError` when the payload claims to be JSON but is broken, or
/// names a window that does not exist.
pub fn parse_signal(text: &str) -> Result<ChannelSignal, SignalError> {
    let trimmed = text.trim();
    if !trimmed.starts_with('{') {
        return Ok(ChannelSignal::Refresh);
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| SignalError::InvalidJson(e.to_string()))?;

    match value.get("mealWindow") {
        None | Some(Value::Null) => Ok(ChannelSignal::Refresh),
        Some(Value::String(window)) => window
            .parse()
            .map(ChannelSignal::Window)
            .map_err(|_| SignalError::UnknownWindow(window.clone())),
        Some(other) => Err(SignalError::WindowNotString(other.to_string())),
    }
}
