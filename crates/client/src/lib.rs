// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! syncline: a resilient connection to a real-time sync server.
//!
//! One WebSocket carries every feature channel (records, events, remote
//! calls, presence). This crate keeps that socket alive: it runs the
//! handshake and authentication, watches the server heartbeat, follows
//! redirects, reconnects with backoff, and buffers work across brief drops.
//!
//! [`Client`] is the async entry point. [`Connection`] is the sans-IO core it
//! drives, usable directly with any [`Transport`].

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod limbo;
pub mod registry;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use client::Client;
pub use config::{normalize_url, Options};
pub use connection::{AuthCallback, ClientEvent, Connection, DoneCallback, Hook, MessageHandler};
pub use error::{ConnectionError, Error, Result};
pub use limbo::{LimboBuffer, ResubscribeNotifier};
pub use registry::{TimeoutEvent, TimeoutRegistry, TimeoutRequest};
pub use state::{ConnectionState, TransitionName};
pub use syncline_core::{Action, Message, Topic};
pub use transport::{SocketEvent, SocketId, Transport, TransportError, WebSocketTransport};
