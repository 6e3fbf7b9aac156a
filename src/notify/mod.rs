//! Real-time proactive meal notifications.
//!
//! The push channel only carries "something changed" signals. The snapshot
//! itself always comes from the request/response API.
//!
//! # Example
//!
//! ```no_run
//! use pantry_client::api::ApiClient;
//! use pantry_client::auth::SessionHolder;
//! use pantry_client::config::ClientConfig;
//! use pantry_client::notify::{ChannelManager, WebSocketConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::default();
//! let holder = SessionHolder::new();
//! let mut manager = ChannelManager::new(
//!     ApiClient::new(&config)?,
//!     WebSocketConnector::new(config.clone()),
//! );
//! let mut updates = manager.subscribe();
//!
//! let sessions = holder.subscribe();
//! tokio::spawn(async move { manager.run(sessions).await });
//!
//! while updates.changed().await.is_ok() {
//!     println!("status: {}", updates.borrow().status);
//! }
//! # Ok(())
//! # }
//! ```

mod channel;
mod fetcher;
mod manager;
mod signal;
mod state;
mod websocket;

pub use channel::{ChannelError, ChannelEvent, PushChannel, PushConnector, NORMAL_CLOSURE};
pub use fetcher::SnapshotFetcher;
pub use manager::{ChannelManager, CLOSE_REASON};
pub use signal::{parse_signal, ChannelSignal, SignalError};
pub use state::{ConnectionStatus, NotificationState};
pub use websocket::{WebSocketChannel, WebSocketConnector};
