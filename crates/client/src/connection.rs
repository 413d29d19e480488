// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The connection core.
//!
//! [`Connection`] performs no I/O and never waits. Its driver feeds it socket
//! events ([`Connection::handle_socket_event`]) and timer expiries
//! ([`Connection::handle_timers`], due at [`Connection::next_deadline`]), and
//! drains what it has to report with [`Connection::poll_event`]. Socket work
//! is handed to a [`Transport`].
//!
//! Lifecycle of one logical connection:
//!
//! ```text
//! CLOSED -> AWAITING_CONNECTION -> CHALLENGING -> AWAITING_AUTHENTICATION
//!        -> AUTHENTICATING -> OPEN
//! ```
//!
//! An unexpected close from any state schedules a reconnect with a linear
//! backoff. A close while OPEN also opens a limbo window during which
//! [`Connection::submit`] buffers work instead of failing it.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use syncline_core::{Action, Change, Clock, Message, StateMachine, TimerId, Timers, Topic};
use tracing::{debug, error, info, warn};

use crate::config::{normalize_url, Options};
use crate::error::{ConnectionError, Error, Result};
use crate::limbo::{LimboBuffer, ResubscribeNotifier};
use crate::registry::{TimeoutRegistry, TimeoutRequest};
use crate::state::{transitions, ConnectionState, TransitionName};
use crate::transport::{SocketEvent, SocketId, Transport};

/// Invoked once with the outcome of an authentication request.
pub type AuthCallback = Box<dyn FnOnce(std::result::Result<Option<Value>, ConnectionError>) + Send>;

/// Invoked once when a submitted operation or a resume completes.
pub type DoneCallback = Box<dyn FnOnce(std::result::Result<(), ConnectionError>) + Send>;

/// Receives inbound messages for one feature topic.
pub type MessageHandler = Box<dyn FnMut(Message) + Send>;

/// Lifecycle hook.
pub type Hook = Box<dyn FnMut() + Send>;

/// Connection-level events, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StateChanged(ConnectionState),
    MaxReconnectionAttemptsReached(u32),
    /// An automatic re-authentication after a reconnect was rejected.
    ReauthenticationFailure(String),
    /// An automatic re-authentication returned different client data.
    ClientDataChanged(Option<Value>),
    Error(ConnectionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    Heartbeat,
    Reconnect,
    Timeout,
    LimboExpired,
}

/// An operation held during a limbo window.
struct Pending {
    message: Message,
    callback: Option<DoneCallback>,
}

impl Pending {
    fn resolve(self, result: std::result::Result<(), ConnectionError>) {
        if let Some(callback) = self.callback {
            callback(result);
        }
    }
}

/// Sans-IO connection state.
pub struct Connection<T: Transport> {
    options: Options,
    original_url: String,
    url: String,
    transport: T,
    fsm: StateMachine<ConnectionState, TransitionName>,
    timers: Timers<TimerEvent>,

    socket: Option<SocketId>,
    socket_open: bool,
    next_socket: u64,
    deliberate_close: bool,
    redirecting: bool,
    redirect_url: Option<String>,

    reconnect_attempt: u32,
    reconnect_timer: Option<TimerId>,
    heartbeat_timer: Option<TimerId>,
    last_heartbeat: Duration,

    auth_params: Option<Value>,
    auth_callback: Option<AuthCallback>,
    client_data: Option<Value>,
    resume_callbacks: Vec<DoneCallback>,

    handlers: HashMap<Topic, MessageHandler>,
    lost_hooks: Vec<Hook>,
    reestablished_hooks: Vec<Hook>,
    exit_limbo_hooks: Vec<Hook>,

    registry: TimeoutRegistry,
    limbo: LimboBuffer<Pending>,
    resubscribe: ResubscribeNotifier,
    events: VecDeque<ClientEvent>,
}

impl<T: Transport> Connection<T> {
    /// Creates the connection and starts opening the first socket.
    pub fn new(url: &str, options: Options, transport: T, clock: Arc<dyn Clock>) -> Result<Self> {
        options.validate()?;
        let url = normalize_url(url, &options.path)?;

        let mut connection = Connection {
            registry: TimeoutRegistry::new(options.subscription_timeout()),
            limbo: LimboBuffer::new(options.offline_buffer_timeout()),
            options,
            original_url: url.clone(),
            url: url.clone(),
            transport,
            fsm: StateMachine::new(ConnectionState::Closed, transitions()),
            timers: Timers::new(clock),
            socket: None,
            socket_open: false,
            next_socket: 0,
            deliberate_close: false,
            redirecting: false,
            redirect_url: None,
            reconnect_attempt: 0,
            reconnect_timer: None,
            heartbeat_timer: None,
            last_heartbeat: Duration::ZERO,
            auth_params: None,
            auth_callback: None,
            client_data: None,
            resume_callbacks: Vec::new(),
            handlers: HashMap::new(),
            lost_hooks: Vec::new(),
            reestablished_hooks: Vec::new(),
            exit_limbo_hooks: Vec::new(),
            resubscribe: ResubscribeNotifier::new(),
            events: VecDeque::new(),
        };
        connection.open_socket(url);
        Ok(connection)
    }

    pub fn state(&self) -> ConnectionState {
        self.fsm.state()
    }

    /// Returns true once the connection has ended for good.
    pub fn in_end_state(&self) -> bool {
        self.fsm.in_end_state()
    }

    /// URL of the current (or last) socket. Differs from the configured URL
    /// while following a redirect.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempt
    }

    /// Client data returned by the last successful authentication.
    pub fn client_data(&self) -> Option<&Value> {
        self.client_data.as_ref()
    }

    /// Earliest instant (on the connection's clock) a timer is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Pops the next event to report.
    pub fn poll_event(&mut self) -> Option<ClientEvent> {
        self.events.pop_front()
    }

    // --- inputs ---------------------------------------------------------

    pub fn handle_socket_event(&mut self, event: SocketEvent) {
        if Some(event.socket()) != self.socket {
            debug!("Ignoring event from retired socket {}", event.socket().as_u64());
            return;
        }
        match event {
            SocketEvent::Opened(_) => self.on_open(),
            SocketEvent::Message(_, message) => self.on_message(message),
            SocketEvent::Error(_, reason) => self.on_error(reason),
            SocketEvent::Closed(_) => {
                self.retire_socket();
                self.on_close();
            }
        }
    }

    /// Fires every timer that is due.
    pub fn handle_timers(&mut self) {
        while let Some((id, event)) = self.timers.pop_expired() {
            match event {
                TimerEvent::Heartbeat => self.check_heartbeat(id),
                TimerEvent::Reconnect => {
                    if self.reconnect_timer == Some(id) {
                        self.reconnect_timer = None;
                        let url = self.original_url.clone();
                        self.open_socket(url);
                    }
                }
                TimerEvent::Timeout => {
                    self.registry.on_timeout(id);
                }
                TimerEvent::LimboExpired => self.on_limbo_expired(id),
            }
        }
    }

    // --- public operations ----------------------------------------------

    /// Authenticates with `params`.
    ///
    /// Sends right away when the server is waiting for credentials, otherwise
    /// holds them until it is. The latest params are kept and resent after
    /// every reconnect.
    pub fn authenticate(&mut self, params: Value, callback: Option<AuthCallback>) {
        if self.fsm.in_end_state() {
            if let Some(callback) = callback {
                callback(Err(ConnectionError::Closed));
            }
            return;
        }
        if let Some(previous) = self.auth_callback.take() {
            previous(Err(ConnectionError::AuthSuperseded));
        }
        self.auth_params = Some(params);
        self.auth_callback = callback;

        let closed = matches!(self.state(), ConnectionState::Closing | ConnectionState::Closed);
        if self.deliberate_close && closed {
            info!("Reopening connection to authenticate");
            self.deliberate_close = false;
            if self.state() == ConnectionState::Closing {
                self.transition(TransitionName::Closed);
            }
            // the closing socket's events are ignored from here on
            self.retire_socket();
            let url = self.original_url.clone();
            self.open_socket(url);
        } else if self.state() == ConnectionState::AwaitingAuthentication {
            self.send_auth();
        }
    }

    /// Closes the connection without reconnecting. Idempotent.
    pub fn close(&mut self) {
        let state = self.state();
        if self.deliberate_close && matches!(state, ConnectionState::Closing | ConnectionState::Closed)
        {
            return;
        }
        info!("Closing connection");
        self.stop(ConnectionError::Closed);

        match self.socket {
            Some(id) => {
                self.transition(TransitionName::Close);
                self.transport.close(id);
            }
            None if state != ConnectionState::Closed => {
                self.transition(TransitionName::Closed);
            }
            None => {}
        }
    }

    /// Closes the connection until [`resume`](Self::resume) is called.
    pub fn pause(&mut self) {
        let state = self.state();
        if self.deliberate_close
            && matches!(state, ConnectionState::Pausing | ConnectionState::Offline)
        {
            return;
        }
        info!("Pausing connection");
        self.stop(ConnectionError::Offline);

        self.transition(TransitionName::Pause);
        match self.socket {
            Some(id) => self.transport.close(id),
            None => {
                self.transition(TransitionName::Offline);
            }
        }
    }

    /// Reconnects after a pause, a close or a terminal failure.
    ///
    /// `callback` runs once the connection is open again, or with the error
    /// that ends it first.
    pub fn resume(&mut self, callback: Option<DoneCallback>) {
        let state = self.state();
        if state == ConnectionState::Open {
            if let Some(callback) = callback {
                callback(Ok(()));
            }
            return;
        }
        if let Some(callback) = callback {
            self.resume_callbacks.push(callback);
        }
        let stopped = self.deliberate_close
            || self.fsm.in_end_state()
            || matches!(state, ConnectionState::Closed | ConnectionState::Offline);
        if !stopped {
            // already on its way back
            return;
        }

        info!("Resuming connection");
        self.fsm.set_in_end_state(false);
        self.deliberate_close = false;
        self.redirecting = false;
        self.reconnect_attempt = 0;
        if let Some(id) = self.reconnect_timer.take() {
            self.timers.cancel(id);
        }
        self.transition(TransitionName::Resume);
        if let Some(old) = self.retire_socket() {
            self.transport.close(old);
        }
        let url = self.original_url.clone();
        self.open_socket(url);
    }

    /// Registers the handler for inbound messages on `topic`.
    pub fn register_handler(
        &mut self,
        topic: Topic,
        handler: impl FnMut(Message) + Send + 'static,
    ) -> Result<()> {
        if topic.is_internal() {
            return Err(Error::ReservedTopic(topic));
        }
        if self.handlers.insert(topic, Box::new(handler)).is_some() {
            debug!("Replaced handler for {}", topic);
        }
        Ok(())
    }

    /// Writes `message` to the live socket.
    pub fn send_message(&mut self, message: &Message) -> Result<()> {
        if message.topic.is_internal() {
            return Err(Error::ReservedTopic(message.topic));
        }
        self.write(message)
    }

    /// Sends `message` if open, buffers it during limbo, fails it otherwise.
    pub fn submit(&mut self, message: Message, callback: Option<DoneCallback>) {
        let pending = Pending { message, callback };
        if self.state() == ConnectionState::Open {
            let result = self.write(&pending.message).map_err(transport_error);
            pending.resolve(result);
            return;
        }
        match self.limbo.push(pending) {
            Ok(()) => debug!("Buffered operation while reconnecting ({} held)", self.limbo.len()),
            Err(pending) => pending.resolve(Err(ConnectionError::Offline)),
        }
    }

    /// Runs `hook` whenever the connection stops being open.
    pub fn on_lost(&mut self, hook: impl FnMut() + Send + 'static) {
        self.lost_hooks.push(Box::new(hook));
    }

    /// Runs `hook` once per lost connection that comes back.
    pub fn on_reestablished(&mut self, hook: impl FnMut() + Send + 'static) {
        self.reestablished_hooks.push(Box::new(hook));
    }

    /// Runs `hook` when a limbo window ends without the connection coming back.
    pub fn on_exit_limbo(&mut self, hook: impl FnMut() + Send + 'static) {
        self.exit_limbo_hooks.push(Box::new(hook));
    }

    /// Registers a deadline for a reply to `request.message`.
    ///
    /// Returns `None` when the connection is not open.
    pub fn add_timeout(&mut self, request: TimeoutRequest) -> Option<TimerId> {
        let connected = self.state() == ConnectionState::Open;
        self.registry.add(request, connected, &mut self.timers, TimerEvent::Timeout)
    }

    /// Removes the deadline answered by `reply`.
    pub fn remove_timeout(&mut self, reply: &Message) -> bool {
        self.registry.remove(reply, &mut self.timers)
    }

    pub fn clear_timeout(&mut self, id: TimerId) -> bool {
        self.registry.clear(id, &mut self.timers)
    }

    // --- socket lifecycle -----------------------------------------------

    fn open_socket(&mut self, url: String) {
        self.next_socket += 1;
        let id = SocketId::new(self.next_socket);
        info!("Opening socket {} to {}", id.as_u64(), url);
        self.socket = Some(id);
        self.socket_open = false;
        self.transport.open(id, &url);
        self.url = url;
    }

    /// Forgets the current socket. Its later events are ignored.
    fn retire_socket(&mut self) -> Option<SocketId> {
        self.socket_open = false;
        self.socket.take()
    }

    fn on_open(&mut self) {
        if self.deliberate_close {
            debug!("Socket opened after close was requested");
            return;
        }
        self.socket_open = true;
        if let Some(id) = self.reconnect_timer.take() {
            self.timers.cancel(id);
        }
        self.reconnect_attempt = 0;
        self.last_heartbeat = self.timers.now();
        self.arm_heartbeat();
        self.transition(TransitionName::Connected);
    }

    fn on_error(&mut self, reason: String) {
        if self.deliberate_close || self.fsm.in_end_state() {
            debug!("Socket error while closing: {}", reason);
            return;
        }
        warn!("Socket error: {}", reason);
        self.events.push_back(ClientEvent::Error(ConnectionError::Transport(reason)));
        if !self.redirecting {
            self.transition(TransitionName::Error);
        }
    }

    fn on_close(&mut self) {
        if let Some(id) = self.heartbeat_timer.take() {
            self.timers.cancel(id);
        }

        if self.redirecting {
            self.redirecting = false;
            let url = self.redirect_url.take().unwrap_or_else(|| self.original_url.clone());
            self.open_socket(url);
            return;
        }
        if self.fsm.in_end_state() {
            debug!("Socket closed in end state {}", self.state());
            return;
        }
        if self.deliberate_close {
            match self.state() {
                ConnectionState::Pausing => {
                    self.transition(TransitionName::Offline);
                }
                ConnectionState::Closed | ConnectionState::Offline => {}
                _ => {
                    self.transition(TransitionName::Closed);
                }
            }
            return;
        }
        self.try_reconnect();
    }

    fn try_reconnect(&mut self) {
        let max = self.options.max_reconnect_attempts;
        if self.reconnect_attempt >= max {
            self.give_up();
            return;
        }

        let delay = self.options.reconnect_delay(self.reconnect_attempt);
        info!(
            "Reconnecting in {}ms (attempt {} of {})",
            delay.as_millis(),
            self.reconnect_attempt + 1,
            max
        );
        self.transition(TransitionName::Reconnect);
        if let Some(id) = self.reconnect_timer.take() {
            self.timers.cancel(id);
        }
        self.reconnect_timer = Some(self.timers.schedule(delay, TimerEvent::Reconnect));
        self.reconnect_attempt += 1;
    }

    fn give_up(&mut self) {
        let attempts = self.reconnect_attempt;
        warn!("Giving up after {} reconnection attempts", attempts);
        self.cancel_connection_timers();
        self.transition(TransitionName::Closed);
        self.fsm.set_in_end_state(true);
        self.events.push_back(ClientEvent::MaxReconnectionAttemptsReached(attempts));
        self.resolve_limbo();
        self.fail_pending(ConnectionError::MaxReconnectionAttempts(attempts));
    }

    /// Ends the connection for good after the server refused it.
    fn terminate(&mut self, reason: ConnectionError) {
        error!("Connection ended: {}", reason);
        self.fsm.set_in_end_state(true);
        self.cancel_connection_timers();
        self.events.push_back(ClientEvent::Error(reason.clone()));
        self.resolve_limbo();
        self.fail_pending(reason);
        if let Some(id) = self.socket {
            self.transport.close(id);
        }
    }

    /// Shared part of close and pause.
    fn stop(&mut self, reason: ConnectionError) {
        self.deliberate_close = true;
        self.redirecting = false;
        self.redirect_url = None;
        self.cancel_connection_timers();
        self.resolve_limbo();
        self.fail_pending(reason);
    }

    fn cancel_connection_timers(&mut self) {
        if let Some(id) = self.heartbeat_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.reconnect_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn fail_pending(&mut self, reason: ConnectionError) {
        if let Some(callback) = self.auth_callback.take() {
            callback(Err(reason.clone()));
        }
        for callback in mem::take(&mut self.resume_callbacks) {
            callback(Err(reason.clone()));
        }
    }

    // --- heartbeat ------------------------------------------------------

    fn arm_heartbeat(&mut self) {
        if let Some(id) = self.heartbeat_timer.take() {
            self.timers.cancel(id);
        }
        let interval = self.options.heartbeat_interval();
        self.heartbeat_timer = Some(self.timers.schedule(interval, TimerEvent::Heartbeat));
    }

    fn check_heartbeat(&mut self, id: TimerId) {
        if self.heartbeat_timer != Some(id) {
            return;
        }
        self.heartbeat_timer = None;

        let silence = self.timers.now().saturating_sub(self.last_heartbeat);
        if silence <= self.options.heartbeat_interval() * 2 {
            self.arm_heartbeat();
            return;
        }

        warn!("No heartbeat for {}ms, closing socket", silence.as_millis());
        if let Some(socket) = self.retire_socket() {
            self.transport.close(socket);
        }
        self.events.push_back(ClientEvent::Error(ConnectionError::HeartbeatTimeout(silence)));
        self.on_close();
    }

    // --- limbo ----------------------------------------------------------

    fn on_limbo_expired(&mut self, id: TimerId) {
        if !self.limbo.is_active() {
            return;
        }
        let held = self.limbo.expire(id);
        if self.limbo.is_active() {
            // stale timer
            return;
        }
        for pending in held {
            pending.resolve(Err(ConnectionError::Offline));
        }
        for hook in &mut self.exit_limbo_hooks {
            hook();
        }
    }

    /// Ends an open limbo window, failing whatever it holds.
    fn resolve_limbo(&mut self) {
        if !self.limbo.is_active() {
            return;
        }
        for pending in self.limbo.flush(&mut self.timers) {
            pending.resolve(Err(ConnectionError::Offline));
        }
        for hook in &mut self.exit_limbo_hooks {
            hook();
        }
    }

    // --- state machine --------------------------------------------------

    fn transition(&mut self, name: TransitionName) -> bool {
        match self.fsm.transition(name) {
            Ok(change) => {
                self.state_changed(change);
                true
            }
            Err(e) => {
                error!("{}", e);
                self.events
                    .push_back(ClientEvent::Error(ConnectionError::InvalidTransition(e.to_string())));
                false
            }
        }
    }

    fn state_changed(&mut self, change: Change<ConnectionState>) {
        debug!("State {} -> {}", change.from, change.to);
        self.events.push_back(ClientEvent::StateChanged(change.to));

        if change.from == ConnectionState::Open && change.to != ConnectionState::Open {
            self.registry.on_connection_lost(&mut self.timers);
            if !self.deliberate_close {
                self.limbo.enter(&mut self.timers, TimerEvent::LimboExpired);
            }
            for hook in &mut self.lost_hooks {
                hook();
            }
        }

        if self.resubscribe.observe(change.to) {
            info!("Connection reestablished");
            for hook in &mut self.reestablished_hooks {
                hook();
            }
        }

        if change.to == ConnectionState::Open {
            let held = self.limbo.flush(&mut self.timers);
            if !held.is_empty() {
                info!("Flushed {} buffered operations", held.len());
            }
            for pending in held {
                let result = self.write(&pending.message).map_err(transport_error);
                pending.resolve(result);
            }
            for callback in mem::take(&mut self.resume_callbacks) {
                callback(Ok(()));
            }
        }
    }

    // --- inbound messages -----------------------------------------------

    fn on_message(&mut self, message: Message) {
        debug!("Received {} {}", message.topic, message.action);
        match message.topic {
            Topic::Connection => self.handle_connection_message(message),
            Topic::Auth => self.handle_auth_message(message),
            topic => {
                if message.is_response() {
                    self.registry.remove(&message, &mut self.timers);
                }
                match self.handlers.get_mut(&topic) {
                    Some(handler) => handler(message),
                    None => warn!("Unsolicited {} {} with no handler", topic, message.action),
                }
            }
        }
    }

    fn handle_connection_message(&mut self, message: Message) {
        match message.action {
            Action::Ping => {
                self.last_heartbeat = self.timers.now();
                self.send_internal(Message::new(Topic::Connection, Action::Pong));
            }
            Action::Challenge => {
                if self.transition(TransitionName::Challenge) {
                    let response = Message::new(Topic::Connection, Action::ChallengeResponse)
                        .with_data(self.original_url.clone());
                    self.send_internal(response);
                }
            }
            Action::Accept => {
                if self.transition(TransitionName::ChallengeAccepted) && self.auth_params.is_some()
                {
                    self.send_auth();
                }
            }
            Action::Rejection => {
                if self.transition(TransitionName::ChallengeDenied) {
                    self.deliberate_close = true;
                    self.terminate(ConnectionError::ChallengeDenied);
                }
            }
            Action::Redirect => self.on_redirect(message),
            Action::AuthenticationTimeout => {
                if self.transition(TransitionName::AuthenticationTimeout) {
                    self.deliberate_close = true;
                    self.terminate(ConnectionError::AuthenticationTimeout);
                }
            }
            Action::Closing => debug!("Server is closing the connection"),
            action => warn!("Unsolicited connection message {}", action),
        }
    }

    fn on_redirect(&mut self, message: Message) {
        let Some(url) = text_payload(&message) else {
            warn!("Redirect without a URL, ignoring");
            return;
        };
        if !self.transition(TransitionName::Redirected) {
            return;
        }
        info!("Redirected to {}", url);
        self.redirecting = true;
        self.redirect_url = Some(url);
        if let Some(id) = self.socket {
            self.transport.close(id);
        }
    }

    fn handle_auth_message(&mut self, message: Message) {
        match message.action {
            Action::AuthSuccessful => {
                if !self.transition(TransitionName::AuthSuccessful) {
                    return;
                }
                let data = message.parsed_data;
                let changed = data != self.client_data;
                self.client_data = data.clone();
                match self.auth_callback.take() {
                    Some(callback) => callback(Ok(data)),
                    None if changed => self.events.push_back(ClientEvent::ClientDataChanged(data)),
                    None => {}
                }
            }
            Action::AuthUnsuccessful => {
                if !self.transition(TransitionName::AuthUnsuccessful) {
                    return;
                }
                let reason =
                    text_payload(&message).unwrap_or_else(|| "authentication failed".to_string());
                warn!("Authentication rejected: {}", reason);
                match self.auth_callback.take() {
                    Some(callback) => callback(Err(ConnectionError::AuthRejected(reason))),
                    None => self.events.push_back(ClientEvent::ReauthenticationFailure(reason)),
                }
            }
            Action::TooManyAuthAttempts => {
                if self.transition(TransitionName::TooManyAuthAttempts) {
                    self.deliberate_close = true;
                    self.terminate(ConnectionError::TooManyAuthAttempts);
                }
            }
            action => warn!("Unsolicited auth message {}", action),
        }
    }

    // --- outbound -------------------------------------------------------

    fn send_auth(&mut self) {
        let Some(params) = self.auth_params.clone() else {
            return;
        };
        if self.transition(TransitionName::Authenticate) {
            self.send_internal(Message::new(Topic::Auth, Action::Request).with_parsed_data(params));
        }
    }

    fn send_internal(&mut self, message: Message) {
        if let Err(e) = self.write(&message) {
            warn!("Failed to send {} {}: {}", message.topic, message.action, e);
        }
    }

    fn write(&mut self, message: &Message) -> Result<()> {
        let id = self.socket.filter(|_| self.socket_open).ok_or(Error::NotConnected)?;
        self.transport.send(id, message)?;
        Ok(())
    }
}

impl<T: Transport> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("state", &self.fsm.state())
            .field("socket", &self.socket)
            .field("socket_open", &self.socket_open)
            .field("reconnect_attempt", &self.reconnect_attempt)
            .field("registry", &self.registry)
            .field("limbo", &self.limbo)
            .finish()
    }
}

fn transport_error(e: Error) -> ConnectionError {
    ConnectionError::Transport(e.to_string())
}

/// A message's payload as text: the raw data, or a string in parsed data.
fn text_payload(message: &Message) -> Option<String> {
    message.data.clone().or_else(|| match &message.parsed_data {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
