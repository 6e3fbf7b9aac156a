//! Current session and the holder that publishes it.

use tokio::sync::watch;

use super::BearerToken;
use crate::api::User;

/// The authenticated identity currently active in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub token: BearerToken,
}

impl Session {
    #[must_use]
    pub fn new(user: User, token: BearerToken) -> Self {
        Self { user, token }
    }
}

/// Holds the current session and notifies subscribers on login and logout.
#[derive(Debug)]
pub struct SessionHolder {
    tx: watch::Sender<Option<Session>>,
}

impl SessionHolder {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current session.
    pub fn login(&self, session: Session) {
        tracing::info!(user_id = session.user.id, "Session started");
        self.tx.send_replace(Some(session));
    }

    /// Clear the current session. Subscribers are only notified if one was present.
    pub fn logout(&self) {
        let cleared = self.tx.send_if_modified(|current| current.take().is_some());
        if cleared {
            tracing::info!("Session ended");
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every session change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }
}

impl Default for SessionHolder {
    fn default() -> Self {
        Self::new()
    }
}
