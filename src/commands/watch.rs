//! Live view of proactive suggestions over the push channel.

use tokio_util::sync::CancellationToken;

use super::{CommandError, Context};
use crate::auth::SessionHolder;
use crate::display;
use crate::notify::{ChannelManager, WebSocketConnector};

/// Run the channel manager for the stored session, printing every state
/// change until `shutdown` fires.
///
/// # Errors
///
/// Returns an error if no session can be established from the stored token.
pub async fn watch(
    ctx: &Context,
    detailed: bool,
    shutdown: CancellationToken,
) -> Result<(), CommandError> {
    let session = ctx.session().await?;
    display::print_user(&session.user);

    let holder = SessionHolder::new();
    let mut manager = ChannelManager::new(
        ctx.anonymous_client()?,
        WebSocketConnector::new(ctx.config.clone()),
    );
    let mut updates = manager.subscribe();
    let sessions = holder.subscribe();
    let runner = tokio::spawn(async move { manager.run(sessions).await });

    holder.login(session);

    let mut last_snapshot = None;
    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                display::print_state(&state);
                if state.latest_snapshot.is_some() && state.latest_snapshot != last_snapshot {
                    if let Some(snapshot) = &state.latest_snapshot {
                        display::print_snapshot(snapshot, detailed);
                    }
                    last_snapshot = state.latest_snapshot;
                }
            }
        }
    }

    holder.logout();
    drop(holder);
    if let Err(e) = runner.await {
        tracing::warn!(error = %e, "Channel manager task failed");
    }
    Ok(())
}
