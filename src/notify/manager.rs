//! Notification channel manager.
//!
//! Keeps one push channel open for as long as a session is present and keeps
//! the exposed snapshot fresh by re-fetching it whenever the channel signals.
//!
//! ```text
//!   Idle ──start──> Connecting ──open──> Live
//!    ^                  │                  │
//!    └──── stop / channel closed / error ──┘
//! ```
//!
//! Every activation carries an epoch. `stop` and `start` bump it, and any
//! fetch result or channel event tagged with an older epoch is dropped, so
//! nothing mutates the state after teardown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    parse_signal, ChannelEvent, ConnectionStatus, NotificationState, PushChannel, PushConnector,
    SnapshotFetcher,
};
use crate::api::SnapshotScope;
use crate::auth::Session;

/// Close reason sent when the manager shuts a channel down.
pub const CLOSE_REASON: &str = "Session ended";

struct Shared<F> {
    fetcher: F,
    state: watch::Sender<NotificationState>,
    live_channels: AtomicUsize,
}

impl<F: SnapshotFetcher> Shared<F> {
    /// Issue one snapshot fetch for the given activation.
    fn spawn_fetch(self: &Arc<Self>, epoch: u64, session: Session, scope: SnapshotScope) {
        if !self.state.send_if_modified(|s| s.begin_fetch(epoch)) {
            tracing::debug!(?scope, "Skipping fetch for ended activation");
            return;
        }

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared
                .fetcher
                .fetch_snapshot(&session, scope)
                .await
                .map_err(|e| {
                    tracing::warn!(error = %e, ?scope, "Snapshot fetch failed");
                    e.to_string()
                });
            let succeeded = outcome.is_ok();
            if shared
                .state
                .send_if_modified(|s| s.finish_fetch(epoch, outcome))
            {
                if succeeded {
                    tracing::debug!(?scope, "Snapshot replaced");
                }
            } else {
                tracing::debug!(?scope, "Discarding snapshot from ended activation");
            }
        });
    }

    fn mark_disconnected(&self, epoch: u64) {
        if self.state.send_if_modified(|s| s.mark_disconnected(epoch)) {
            tracing::info!("Push channel disconnected");
        }
    }
}

/// Counts a channel as live until dropped.
struct LiveChannel<'a>(&'a AtomicUsize);

impl<'a> LiveChannel<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LiveChannel<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_channel<F, C>(
    shared: Arc<Shared<F>>,
    connector: Arc<C>,
    session: Session,
    epoch: u64,
    cancel: CancellationToken,
) where
    F: SnapshotFetcher,
    C: PushConnector,
{
    let opened = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        opened = connector.open(&session) => opened,
    };

    let mut channel = match opened {
        Ok(channel) => channel,
        Err(e) => {
            tracing::warn!(error = %e, "Push channel failed to open");
            shared.mark_disconnected(epoch);
            return;
        }
    };
    let _live = LiveChannel::new(&shared.live_channels);

    if shared.state.send_if_modified(|s| s.mark_connected(epoch)) {
        tracing::info!(user_id = session.user.id, "Push channel connected");
    }

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            event = channel.recv() => Some(event),
        };

        match event {
            None => {
                if let Err(e) = channel.close(CLOSE_REASON).await {
                    tracing::debug!(error = %e, "Push channel close failed");
                }
                tracing::debug!("Push channel closed by manager");
                return;
            }
            Some(ChannelEvent::Message(text)) => match parse_signal(&text) {
                Ok(signal) => {
                    tracing::debug!(?signal, "Push signal received, refetching snapshot");
                    shared.spawn_fetch(epoch, session.clone(), signal.scope());
                }
                Err(e) => {
                    tracing::warn!(error = %e, payload = %text, "Ignoring malformed push payload");
                }
            },
            Some(ChannelEvent::Closed { code, reason }) => {
                tracing::info!(?code, reason = %reason, "Push channel closed by peer");
                shared.mark_disconnected(epoch);
                return;
            }
            Some(ChannelEvent::Error(error)) => {
                tracing::warn!(error = %error, "Push channel error");
                if let Err(e) = channel.close(CLOSE_REASON).await {
                    tracing::debug!(error = %e, "Push channel close failed");
                }
                shared.mark_disconnected(epoch);
                return;
            }
        }
    }
}

struct Activation {
    session: Session,
    cancel: CancellationToken,
    channel_task: JoinHandle<()>,
}

/// Owns the push channel for the current session and publishes
/// [`NotificationState`] to views.
pub struct ChannelManager<F: SnapshotFetcher, C: PushConnector> {
    shared: Arc<Shared<F>>,
    connector: Arc<C>,
    active: Option<Activation>,
}

impl<F: SnapshotFetcher, C: PushConnector> ChannelManager<F, C> {
    #[must_use]
    pub fn new(fetcher: F, connector: C) -> Self {
        let (state, _rx) = watch::channel(NotificationState::default());
        Self {
            shared: Arc::new(Shared {
                fetcher,
                state,
                live_channels: AtomicUsize::new(0),
            }),
            connector: Arc::new(connector),
            active: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> NotificationState {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.shared.state.borrow().status
    }

    /// Receiver notified on every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.shared.state.subscribe()
    }

    /// Number of channels currently open. Never more than one.
    #[must_use]
    pub fn live_channels(&self) -> usize {
        self.shared.live_channels.load(Ordering::SeqCst)
    }

    /// Session of the current activation, if any.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.active.as_ref().map(|active| &active.session)
    }

    /// Activate for a session: fetch the snapshot, then open the channel.
    ///
    /// An existing activation is stopped first and its channel is closed
    /// before the new one is opened.
    pub async fn start(&mut self, session: Session) {
        if self.active.is_some() {
            self.stop().await;
        }

        let mut epoch = 0;
        self.shared.state.send_modify(|s| epoch = s.activate());
        tracing::info!(user_id = session.user.id, epoch, "Activating notification channel");

        self.shared
            .spawn_fetch(epoch, session.clone(), SnapshotScope::Current);

        let cancel = CancellationToken::new();
        let channel_task = tokio::spawn(run_channel(
            Arc::clone(&self.shared),
            Arc::clone(&self.connector),
            session.clone(),
            epoch,
            cancel.clone(),
        ));

        self.active = Some(Activation {
            session,
            cancel,
            channel_task,
        });
    }

    /// Tear down: close the channel, drop the snapshot and ignore any fetch
    /// still in flight.
    pub async fn stop(&mut self) {
        self.shared.state.send_if_modified(|s| {
            let changed = s.status != ConnectionStatus::Disconnected
                || s.latest_snapshot.is_some()
                || s.loading;
            s.deactivate();
            changed
        });

        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            if let Err(e) = active.channel_task.await {
                tracing::warn!(error = %e, "Push channel task failed");
            }
            tracing::info!(user_id = active.session.user.id, "Notification channel stopped");
        }
    }

    /// Follow a session subscription: start on every new session, stop when it
    /// is cleared. Returns once the sender is gone, after stopping.
    pub async fn run(&mut self, mut sessions: watch::Receiver<Option<Session>>) {
        loop {
            let current = sessions.borrow_and_update().clone();
            match current {
                Some(session) => self.start(session).await,
                None => self.stop().await,
            }
            if sessions.changed().await.is_err() {
                break;
            }
        }
        self.stop().await;
    }
}

impl<F: SnapshotFetcher, C: PushConnector> Drop for ChannelManager<F, C> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            self.shared.state.send_modify(NotificationState::deactivate);
            active.cancel.cancel();
        }
    }
}
