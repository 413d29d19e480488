// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Async handle over a [`Connection`] running in a background task.
//!
//! The task owns the connection and is the only code that touches it. It
//! waits on three things at once: commands from [`Client`] handles, events
//! from the transport, and the connection's next timer deadline. After every
//! step it publishes the resulting state and events.

use std::sync::Arc;

use serde_json::Value;
use syncline_core::{Message, SystemClock, TimerId, Topic};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::debug;

use crate::config::Options;
use crate::connection::{ClientEvent, Connection, Hook, MessageHandler};
use crate::error::{ConnectionError, Error, Result};
use crate::registry::TimeoutRequest;
use crate::state::ConnectionState;
use crate::transport::{SocketEvent, Transport, WebSocketTransport};

const COMMAND_BUFFER: usize = 64;
const EVENT_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Authenticate { params: Value, reply: Reply<std::result::Result<Option<Value>, ConnectionError>> },
    Close { reply: Reply<()> },
    Pause { reply: Reply<()> },
    Resume { reply: Reply<std::result::Result<(), ConnectionError>> },
    Send { message: Message, reply: Reply<Result<()>> },
    Submit { message: Message, reply: Reply<std::result::Result<(), ConnectionError>> },
    RegisterHandler { topic: Topic, handler: MessageHandler, reply: Reply<Result<()>> },
    OnLost(Hook),
    OnReestablished(Hook),
    OnExitLimbo(Hook),
    AddTimeout { request: TimeoutRequest, reply: Reply<Option<TimerId>> },
    RemoveTimeout { reply_to: Message, reply: Reply<bool> },
    ClearTimeout { id: TimerId, reply: Reply<bool> },
}

/// Handle to a connection running in the background.
///
/// Cloning is cheap. The connection is closed when the last handle is dropped.
#[derive(Clone)]
pub struct Client {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
    events: broadcast::Sender<ClientEvent>,
}

impl Client {
    /// Connects to `url` over WebSocket.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(url: &str, options: Options) -> Result<Self> {
        let (transport, socket_events) = WebSocketTransport::new();
        Self::with_transport(url, options, transport, socket_events)
    }

    /// Runs a connection over any transport.
    ///
    /// `socket_events` must receive the events the transport produces.
    pub fn with_transport<T>(
        url: &str,
        options: Options,
        transport: T,
        socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    ) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let clock = SystemClock::new();
        let connection = Connection::new(url, options, transport, Arc::new(clock))?;

        let (commands, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state) = watch::channel(connection.state());
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        tokio::spawn(run(connection, clock, command_rx, socket_events, state_tx, events.clone()));
        Ok(Client { commands, state, events })
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver notified on every state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Subscribes to connection events from now on.
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Authenticates and waits for the server's answer.
    ///
    /// Returns the client data the server attached to the login.
    pub async fn authenticate(&self, params: Value) -> Result<Option<Value>> {
        let result = self.request(|reply| Command::Authenticate { params, reply }).await?;
        Ok(result?)
    }

    /// Closes the connection for good.
    pub async fn close(&self) -> Result<()> {
        self.request(|reply| Command::Close { reply }).await
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await
    }

    /// Reconnects after a pause or close and waits until the connection is open.
    pub async fn resume(&self) -> Result<()> {
        let result = self.request(|reply| Command::Resume { reply }).await?;
        Ok(result?)
    }

    /// Writes `message` to the live socket.
    pub async fn send_message(&self, message: Message) -> Result<()> {
        self.request(|reply| Command::Send { message, reply }).await?
    }

    /// Sends `message`, riding out a brief disconnect.
    pub async fn submit(&self, message: Message) -> Result<()> {
        let result = self.request(|reply| Command::Submit { message, reply }).await?;
        Ok(result?)
    }

    pub async fn register_handler(
        &self,
        topic: Topic,
        handler: impl FnMut(Message) + Send + 'static,
    ) -> Result<()> {
        let handler: MessageHandler = Box::new(handler);
        self.request(|reply| Command::RegisterHandler { topic, handler, reply }).await?
    }

    pub async fn on_lost(&self, hook: impl FnMut() + Send + 'static) -> Result<()> {
        self.tell(Command::OnLost(Box::new(hook))).await
    }

    pub async fn on_reestablished(&self, hook: impl FnMut() + Send + 'static) -> Result<()> {
        self.tell(Command::OnReestablished(Box::new(hook))).await
    }

    pub async fn on_exit_limbo(&self, hook: impl FnMut() + Send + 'static) -> Result<()> {
        self.tell(Command::OnExitLimbo(Box::new(hook))).await
    }

    /// Registers a reply deadline. `None` means the connection is not open.
    pub async fn add_timeout(&self, request: TimeoutRequest) -> Result<Option<TimerId>> {
        self.request(|reply| Command::AddTimeout { request, reply }).await
    }

    pub async fn remove_timeout(&self, reply_to: Message) -> Result<bool> {
        self.request(|reply| Command::RemoveTimeout { reply_to, reply }).await
    }

    pub async fn clear_timeout(&self, id: TimerId) -> Result<bool> {
        self.request(|reply| Command::ClearTimeout { id, reply }).await
    }

    async fn tell(&self, command: Command) -> Result<()> {
        self.commands.send(command).await.map_err(|_| Error::ClientGone)
    }

    async fn request<R>(&self, command: impl FnOnce(Reply<R>) -> Command) -> Result<R> {
        let (reply, rx) = oneshot::channel();
        self.tell(command(reply)).await?;
        rx.await.map_err(|_| Error::ClientGone)
    }
}

async fn run<T: Transport>(
    mut connection: Connection<T>,
    clock: SystemClock,
    mut commands: mpsc::Receiver<Command>,
    mut socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<ClientEvent>,
) {
    loop {
        publish(&mut connection, &state, &events);

        let deadline = connection.next_deadline().map(|at| clock.instant_at(at));
        let timer = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at.into()).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => apply(&mut connection, command),
                None => {
                    debug!("All client handles dropped, closing");
                    connection.close();
                    break;
                }
            },
            Some(event) = socket_events.recv() => connection.handle_socket_event(event),
            () = timer => connection.handle_timers(),
        }
    }
    publish(&mut connection, &state, &events);
}

fn publish<T: Transport>(
    connection: &mut Connection<T>,
    state: &watch::Sender<ConnectionState>,
    events: &broadcast::Sender<ClientEvent>,
) {
    while let Some(event) = connection.poll_event() {
        // no subscribers is fine
        let _ = events.send(event);
    }
    let current = connection.state();
    state.send_if_modified(|published| {
        if *published == current {
            return false;
        }
        *published = current;
        true
    });
}

fn apply<T: Transport>(connection: &mut Connection<T>, command: Command) {
    match command {
        Command::Authenticate { params, reply } => {
            connection.authenticate(
                params,
                Some(Box::new(move |result| {
                    let _ = reply.send(result);
                })),
            );
        }
        Command::Close { reply } => {
            connection.close();
            let _ = reply.send(());
        }
        Command::Pause { reply } => {
            connection.pause();
            let _ = reply.send(());
        }
        Command::Resume { reply } => {
            connection.resume(Some(Box::new(move |result| {
                let _ = reply.send(result);
            })));
        }
        Command::Send { message, reply } => {
            let _ = reply.send(connection.send_message(&message));
        }
        Command::Submit { message, reply } => {
            connection.submit(
                message,
                Some(Box::new(move |result| {
                    let _ = reply.send(result);
                })),
            );
        }
        Command::RegisterHandler { topic, handler, reply } => {
            let _ = reply.send(connection.register_handler(topic, handler));
        }
        Command::OnLost(hook) => connection.on_lost(hook),
        Command::OnReestablished(hook) => connection.on_reestablished(hook),
        Command::OnExitLimbo(hook) => connection.on_exit_limbo(hook),
        Command::AddTimeout { request, reply } => {
            let _ = reply.send(connection.add_timeout(request));
        }
        Command::RemoveTimeout { reply_to, reply } => {
            let _ = reply.send(connection.remove_timeout(&reply_to));
        }
        Command::ClearTimeout { id, reply } => {
            let _ = reply.send(connection.clear_timeout(id));
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
