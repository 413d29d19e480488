// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for connection and client tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use syncline_core::{Action, ManualClock, Message, Topic};

use crate::config::Options;
use crate::connection::{ClientEvent, Connection};
use crate::state::ConnectionState;
use crate::transport::{SocketEvent, SocketId, Transport, TransportError, TransportResult};

pub const URL: &str = "ws://sync.test:6020/sync";

/// A call made on the mock transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open(SocketId, String),
    Send(SocketId, Message),
    Close(SocketId),
}

/// Mock transport for testing without real sockets.
///
/// Clones share one call log, so a test can keep a handle after moving the
/// transport into a connection.
#[derive(Clone, Default)]
pub struct MockTransport {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_sends: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Sockets opened so far, in order.
    pub fn opened(&self) -> Vec<(SocketId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Open(id, url) => Some((id, url)),
                _ => None,
            })
            .collect()
    }

    /// Messages sent so far, on any socket.
    pub fn sent(&self) -> Vec<Message> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send(_, message) => Some(message),
                _ => None,
            })
            .collect()
    }

    /// Actions of messages sent so far.
    pub fn sent_actions(&self) -> Vec<Action> {
        self.sent().into_iter().map(|m| m.action).collect()
    }

    pub fn closed(&self) -> Vec<SocketId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Close(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// The most recently opened socket.
    pub fn last_socket(&self) -> SocketId {
        self.opened().last().map(|(id, _)| *id).expect("no socket opened")
    }

    /// Makes every following send fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

impl Transport for MockTransport {
    fn open(&mut self, id: SocketId, url: &str) {
        self.calls.lock().unwrap().push(Call::Open(id, url.to_string()));
    }

    fn send(&mut self, id: SocketId, message: &Message) -> TransportResult<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::SendFailed("mock failure".into()));
        }
        self.calls.lock().unwrap().push(Call::Send(id, message.clone()));
        Ok(())
    }

    fn close(&mut self, id: SocketId) {
        self.calls.lock().unwrap().push(Call::Close(id));
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn connection_message(action: Action) -> Message {
    Message::new(Topic::Connection, action)
}

pub fn auth_message(action: Action) -> Message {
    Message::new(Topic::Auth, action)
}

/// A connection on a mock transport and a manual clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub transport: MockTransport,
    pub conn: Connection<MockTransport>,
}

impl Harness {
    pub fn new(options: Options) -> Self {
        let clock = Arc::new(ManualClock::new());
        let transport = MockTransport::new();
        let conn = Connection::new(URL, options, transport.clone(), clock.clone()).unwrap();
        Harness { clock, transport, conn }
    }

    pub fn socket(&self) -> SocketId {
        self.transport.last_socket()
    }

    pub fn open(&mut self) {
        let id = self.socket();
        self.conn.handle_socket_event(SocketEvent::Opened(id));
    }

    pub fn receive(&mut self, message: Message) {
        let id = self.socket();
        self.conn.handle_socket_event(SocketEvent::Message(id, message));
    }

    /// The latest socket fails: an error followed by the close.
    pub fn fail(&mut self, reason: &str) {
        let id = self.socket();
        self.conn.handle_socket_event(SocketEvent::Error(id, reason.to_string()));
        self.conn.handle_socket_event(SocketEvent::Closed(id));
    }

    /// The latest socket closes without an error.
    pub fn drop_socket(&mut self) {
        let id = self.socket();
        self.conn.handle_socket_event(SocketEvent::Closed(id));
    }

    /// Opens the latest socket and completes the challenge.
    pub fn handshake(&mut self) {
        self.open();
        self.receive(connection_message(Action::Challenge));
        self.receive(connection_message(Action::Accept));
    }

    /// Server accepts the pending authentication.
    pub fn login(&mut self, client_data: Option<Value>) {
        let mut message = auth_message(Action::AuthSuccessful);
        message.parsed_data = client_data;
        self.receive(message);
    }

    /// Handshake, authenticate and log in on the latest socket.
    pub fn connect_and_login(&mut self) {
        self.handshake();
        self.conn.authenticate(json!({"user": "ana"}), None);
        self.login(None);
        assert_eq!(self.conn.state(), ConnectionState::Open);
    }

    pub fn now(&self) -> Duration {
        use syncline_core::Clock;
        self.clock.now()
    }

    /// Moves the clock to `at`, firing timers at their own deadlines.
    pub fn advance_to(&mut self, at: Duration) {
        while let Some(deadline) = self.conn.next_deadline() {
            if deadline > at {
                break;
            }
            if deadline > self.now() {
                self.clock.set(deadline);
            }
            self.conn.handle_timers();
        }
        self.clock.set(at);
        self.conn.handle_timers();
    }

    pub fn events(&mut self) -> Vec<ClientEvent> {
        std::iter::from_fn(|| self.conn.poll_event()).collect()
    }

    /// Drains events, keeping only the states passed through.
    pub fn states(&mut self) -> Vec<ConnectionState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::StateChanged(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}
