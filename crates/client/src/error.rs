// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the syncline client.

use std::time::Duration;

use syncline_core::Topic;
use thiserror::Error;

use crate::registry::TimeoutEvent;
use crate::transport::TransportError;

/// Failures of the connection itself, or of a single request riding on it.
///
/// These are cloned onto the event channel and into request callbacks, so
/// they carry only plain data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("heartbeat timeout: no ping from server for {0:?}")]
    HeartbeatTimeout(Duration),

    #[error("connection challenge denied by server")]
    ChallengeDenied,

    #[error("server closed the connection: authentication not completed in time")]
    AuthenticationTimeout,

    #[error("too many authentication attempts")]
    TooManyAuthAttempts,

    #[error("gave up after {0} reconnection attempts")]
    MaxReconnectionAttempts(u32),

    #[error("client is offline")]
    Offline,

    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    #[error("authentication superseded by a newer request")]
    AuthSuperseded,

    #[error("{event} for {topic} {name}")]
    Timeout { event: TimeoutEvent, topic: Topic, name: String },

    #[error("connection closed")]
    Closed,

    #[error("{0}")]
    InvalidTransition(String),
}

/// All errors returned by the client API.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] syncline_core::Error),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("not connected\n  hint: wait for the connection to open, or use submit() to buffer")]
    NotConnected,

    #[error("topic {0} is reserved for the connection\n  hint: handlers can only be registered for feature topics")]
    ReservedTopic(Topic),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("client task has stopped")]
    ClientGone,
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
