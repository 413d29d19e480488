// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for WebSocket communication.
//!
//! The connection core never awaits socket I/O. It asks a [`Transport`] to
//! open, write to, or close a socket identified by a [`SocketId`], and the
//! transport reports back asynchronously with [`SocketEvent`]s carrying the
//! same id. This allows:
//! - Real WebSocket connections for production ([`WebSocketTransport`])
//! - Recording transports for unit testing

use std::collections::HashMap;

use futures_util::{SinkExt, StreamExt};
use syncline_core::Message;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as Frame;
use tracing::{debug, warn};

/// Identity of one physical socket.
///
/// Every open, reconnect or redirect uses a fresh id, so events from a socket
/// that has since been replaced can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SocketId(u64);

impl SocketId {
    pub fn new(id: u64) -> Self {
        SocketId(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Something that happened on a socket.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Opened(SocketId),
    Message(SocketId, Message),
    /// The socket failed. A `Closed` event always follows.
    Error(SocketId, String),
    Closed(SocketId),
}

impl SocketEvent {
    /// Returns the socket the event belongs to.
    pub fn socket(&self) -> SocketId {
        match self {
            SocketEvent::Opened(id)
            | SocketEvent::Message(id, _)
            | SocketEvent::Error(id, _)
            | SocketEvent::Closed(id) => *id,
        }
    }
}

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The socket is not open.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Serialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Socket operations requested by the connection core.
///
/// Implementations must not block; results are delivered later as
/// [`SocketEvent`]s.
pub trait Transport: Send {
    /// Starts opening a socket to `url`.
    fn open(&mut self, id: SocketId, url: &str);

    /// Queues a message for sending on socket `id`.
    fn send(&mut self, id: SocketId, message: &Message) -> TransportResult<()>;

    /// Starts closing socket `id`. A `Closed` event follows.
    fn close(&mut self, id: SocketId);
}

enum Outbound {
    Frame(String),
    Close,
}

/// WebSocket transport implementation using tokio-tungstenite.
///
/// Each socket runs in its own task. Must be used from within a Tokio runtime.
pub struct WebSocketTransport {
    events: mpsc::UnboundedSender<SocketEvent>,
    sockets: HashMap<SocketId, mpsc::UnboundedSender<Outbound>>,
}

impl WebSocketTransport {
    /// Creates a transport and the stream its socket events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SocketEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (WebSocketTransport { events, sockets: HashMap::new() }, rx)
    }
}

impl Transport for WebSocketTransport {
    fn open(&mut self, id: SocketId, url: &str) {
        self.sockets.retain(|_, tx| !tx.is_closed());
        let (tx, rx) = mpsc::unbounded_channel();
        self.sockets.insert(id, tx);
        tokio::spawn(run_socket(id, url.to_string(), rx, self.events.clone()));
    }

    fn send(&mut self, id: SocketId, message: &Message) -> TransportResult<()> {
        let json =
            message.to_json().map_err(|e| TransportError::SerializationError(e.to_string()))?;
        let socket = self.sockets.get(&id).ok_or(TransportError::ConnectionClosed)?;
        socket.send(Outbound::Frame(json)).map_err(|_| TransportError::ConnectionClosed)
    }

    fn close(&mut self, id: SocketId) {
        if let Some(socket) = self.sockets.remove(&id) {
            let _ = socket.send(Outbound::Close);
        }
    }
}

async fn run_socket(
    id: SocketId,
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let connect = tokio_tungstenite::connect_async(url.as_str());
    tokio::pin!(connect);

    let ws = loop {
        tokio::select! {
            result = &mut connect => match result {
                Ok((ws, _)) => break ws,
                Err(e) => {
                    let err = TransportError::ConnectionFailed(e.to_string());
                    debug!(socket = id.as_u64(), %url, "{err}");
                    let _ = events.send(SocketEvent::Error(id, err.to_string()));
                    let _ = events.send(SocketEvent::Closed(id));
                    return;
                }
            },
            command = outbound.recv() => match command {
                Some(Outbound::Frame(_)) => debug!(socket = id.as_u64(), "dropping frame queued before open"),
                Some(Outbound::Close) | None => {
                    let _ = events.send(SocketEvent::Closed(id));
                    return;
                }
            },
        }
    };

    debug!(socket = id.as_u64(), %url, "socket open");
    let _ = events.send(SocketEvent::Opened(id));
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Frame::Text(text))) => match Message::from_json(text.as_str()) {
                    Ok(message) => {
                        let _ = events.send(SocketEvent::Message(id, message));
                    }
                    Err(e) => warn!(socket = id.as_u64(), "dropping undecodable frame: {e}"),
                },
                Some(Ok(Frame::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = events.send(SocketEvent::Error(id, e.to_string()));
                    break;
                }
            },
            command = outbound.recv() => match command {
                Some(Outbound::Frame(json)) => {
                    if let Err(e) = sink.send(Frame::Text(json.into())).await {
                        let err = TransportError::SendFailed(e.to_string());
                        let _ = events.send(SocketEvent::Error(id, err.to_string()));
                        break;
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = sink.close().await;
                    break;
                }
            },
        }
    }

    debug!(socket = id.as_u64(), "socket closed");
    let _ = events.send(SocketEvent::Closed(id));
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
