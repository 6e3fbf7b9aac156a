//! Push channel abstraction.

use async_trait::async_trait;

use crate::auth::Session;

/// Close code for an orderly shutdown.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Something that happened on an open channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// An inbound text message.
    Message(String),
    /// The peer closed the channel, or the stream ended.
    Closed { code: Option<u16>, reason: String },
    /// The channel failed.
    Error(String),
}

/// Errors opening or closing a channel.
#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error("Invalid push channel URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to open push channel: {0}")]
    Connect(String),

    #[error("Failed to close push channel: {0}")]
    Close(String),
}

/// One open push channel.
#[async_trait]
pub trait PushChannel: Send {
    /// Wait for the next event. After a terminal event the channel is done.
    async fn recv(&mut self) -> ChannelEvent;

    /// Close with a normal-closure indication.
    async fn close(&mut self, reason: &str) -> Result<(), ChannelError>;
}

/// Opens push channels for a session.
#[async_trait]
pub trait PushConnector: Send + Sync + 'static {
    type Channel: PushChannel + 'static;

    /// Open a channel authenticated as the session. Returning `Ok` confirms
    /// the channel is established.
    async fn open(&self, session: &Session) -> Result<Self::Channel, ChannelError>;
}
