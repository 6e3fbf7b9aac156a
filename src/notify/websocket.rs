//! Websocket implementation of the push channel.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::{ChannelError, ChannelEvent, PushChannel, PushConnector};
use crate::auth::Session;
use crate::config::ClientConfig;

/// Run a socket operation, giving up after `limit`.
async fn bounded<T, E: fmt::Display>(
    limit: Duration,
    operation: impl Future<Output = Result<T, E>>,
) -> Result<T, String> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!("timed out after {}ms", limit.as_millis())),
    }
}

/// Opens `ws://.../ws?token=<bearer>` channels.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    config: ClientConfig,
}

impl WebSocketConnector {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PushConnector for WebSocketConnector {
    type Channel = WebSocketChannel;

    async fn open(&self, session: &Session) -> Result<WebSocketChannel, ChannelError> {
        let url = self
            .config
            .push_url_for(session.token.expose())
            .map_err(|e| ChannelError::InvalidUrl(e.to_string()))?;

        tracing::debug!(
            host = url.host_str().unwrap_or_default(),
            path = url.path(),
            "Opening push channel"
        );

        let timeout = self.config.connect_timeout();
        let (stream, _response) = bounded(timeout, connect_async(url.as_str()))
            .await
            .map_err(ChannelError::Connect)?;

        Ok(WebSocketChannel {
            stream,
            close_timeout: timeout,
            closed: false,
        })
    }
}

/// An open websocket push channel.
pub struct WebSocketChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Upper bound on sending the close frame to a stalled peer.
    close_timeout: Duration,
    closed: bool,
}

#[async_trait]
impl PushChannel for WebSocketChannel {
    async fn recv(&mut self) -> ChannelEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return ChannelEvent::Message(text.to_string()),
                Some(Ok(Message::Binary(data))) => {
                    return ChannelEvent::Message(String::from_utf8_lossy(&data).into_owned())
                }
                Some(Ok(Message::Close(frame))) => {
                    self.closed = true;
                    return match frame {
                        Some(frame) => ChannelEvent::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.to_string(),
                        },
                        None => ChannelEvent::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    };
                }
                // Pings are answered by tungstenite while reading.
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => {
                    self.closed = true;
                    return ChannelEvent::Error(e.to_string());
                }
                None => {
                    self.closed = true;
                    return ChannelEvent::Closed {
                        code: None,
                        reason: "stream ended".to_string(),
                    };
                }
            }
        }
    }

    async fn close(&mut self, reason: &str) -> Result<(), ChannelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: reason.to_string().into(),
        };
        bounded(self.close_timeout, self.stream.close(Some(frame)))
            .await
            .map_err(ChannelError::Close)
    }
}
