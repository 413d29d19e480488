// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use syncline::{ConnectionError, ConnectionState};
use tempfile::TempDir;
use yare::parameterized;

fn args(url: &str) -> ConnectArgs {
    ConnectArgs { url: url.into(), config: None, auth: None, max_attempts: None, path: None }
}

#[parameterized(
    denied = { ConnectionState::ChallengeDenied },
    too_many = { ConnectionState::TooManyAuthAttempts },
    auth_timeout = { ConnectionState::ConnectionAuthenticationTimeout },
)]
fn terminal_states_end_the_loop(state: ConnectionState) {
    let reason = final_reason(&ClientEvent::StateChanged(state)).unwrap();
    assert!(matches!(reason, Error::Ended(s) if s == state));
}

#[parameterized(
    open = { ClientEvent::StateChanged(ConnectionState::Open) },
    reconnecting = { ClientEvent::StateChanged(ConnectionState::Reconnecting) },
    transport = { ClientEvent::Error(ConnectionError::Transport("refused".into())) },
)]
fn passing_events_keep_going(event: ClientEvent) {
    assert!(final_reason(&event).is_none());
}

#[test]
fn giving_up_ends_the_loop() {
    let reason = final_reason(&ClientEvent::MaxReconnectionAttemptsReached(5)).unwrap();
    assert!(matches!(reason, Error::GaveUp(5)));
}

#[test]
fn flags_override_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("syncline.toml");
    std::fs::write(&path, "max_reconnect_attempts = 9\npath = \"/a\"\n").unwrap();

    let mut connect = args("localhost");
    connect.config = Some(path);
    assert_eq!(build_options(&connect).unwrap().max_reconnect_attempts, 9);

    connect.max_attempts = Some(1);
    connect.path = Some("/b".into());
    let options = build_options(&connect).unwrap();
    assert_eq!(options.max_reconnect_attempts, 1);
    assert_eq!(options.path, "/b");
}
