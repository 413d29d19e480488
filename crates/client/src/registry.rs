// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlines for acknowledgements and responses.
//!
//! Every request that expects a reply registers a timeout here. The entry is
//! keyed by topic, action and the message's unique name (correlation id or
//! name), so at most one deadline is live per outstanding request. When the
//! reply arrives the entry is removed; when the deadline passes the entry is
//! removed first and then its callback is told.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use syncline_core::{Action, Message, TimerId, Timers, Topic};
use tracing::{debug, warn};

/// What a request was waiting for when its deadline passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeoutEvent {
    AckTimeout,
    ResponseTimeout,
}

impl fmt::Display for TimeoutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutEvent::AckTimeout => f.write_str("ack timeout"),
            TimeoutEvent::ResponseTimeout => f.write_str("response timeout"),
        }
    }
}

/// Invoked once when a deadline passes.
pub type TimeoutCallback = Box<dyn FnOnce(TimeoutEvent, Message) + Send>;

/// A deadline to register for `message`.
pub struct TimeoutRequest {
    pub message: Message,
    /// Defaults to [`TimeoutEvent::AckTimeout`].
    pub event: Option<TimeoutEvent>,
    /// Defaults to the registry's default timeout.
    pub duration: Option<Duration>,
    pub callback: Option<TimeoutCallback>,
}

impl TimeoutRequest {
    pub fn new(message: Message) -> Self {
        TimeoutRequest { message, event: None, duration: None, callback: None }
    }

    pub fn with_event(mut self, event: TimeoutEvent) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_callback(mut self, callback: impl FnOnce(TimeoutEvent, Message) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for TimeoutRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutRequest")
            .field("message", &self.message)
            .field("event", &self.event)
            .field("duration", &self.duration)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TimeoutKey {
    topic: Topic,
    action: Action,
    name: Option<String>,
}

impl TimeoutKey {
    fn new(topic: Topic, action: Action, message: &Message) -> Self {
        TimeoutKey { topic, action, name: message.unique_name().map(str::to_string) }
    }
}

struct Entry {
    key: TimeoutKey,
    event: TimeoutEvent,
    message: Message,
    callback: Option<TimeoutCallback>,
}

/// Outstanding request deadlines.
pub struct TimeoutRegistry {
    default_timeout: Duration,
    entries: HashMap<TimerId, Entry>,
    by_key: HashMap<TimeoutKey, TimerId>,
}

impl TimeoutRegistry {
    pub fn new(default_timeout: Duration) -> Self {
        TimeoutRegistry { default_timeout, entries: HashMap::new(), by_key: HashMap::new() }
    }

    /// Registers a deadline, replacing any live one for the same request.
    ///
    /// Returns `None` without scheduling anything when `connected` is false;
    /// the connection-lost path would discard the entry anyway.
    pub fn add<E>(
        &mut self,
        request: TimeoutRequest,
        connected: bool,
        timers: &mut Timers<E>,
        timer_event: E,
    ) -> Option<TimerId> {
        if !connected {
            debug!(topic = %request.message.topic, "not connected, timeout not registered");
            return None;
        }

        let TimeoutRequest { message, event, duration, callback } = request;
        let key = TimeoutKey::new(message.topic, message.action, &message);
        if let Some(previous) = self.by_key.remove(&key) {
            self.entries.remove(&previous);
            timers.cancel(previous);
        }

        let id = timers.schedule(duration.unwrap_or(self.default_timeout), timer_event);
        self.by_key.insert(key.clone(), id);
        self.entries.insert(
            id,
            Entry { key, event: event.unwrap_or(TimeoutEvent::AckTimeout), message, callback },
        );
        Some(id)
    }

    /// Removes the deadline a reply resolves.
    ///
    /// The reply's action is mapped back to the request's action first, so a
    /// `READ_RESPONSE` clears the `READ` deadline.
    pub fn remove<E>(&mut self, reply: &Message, timers: &mut Timers<E>) -> bool {
        let key = TimeoutKey::new(reply.topic, reply.request_action(), reply);
        let Some(id) = self.by_key.remove(&key) else {
            debug!(topic = %reply.topic, action = %reply.action, "no pending timeout for reply");
            return false;
        };
        self.entries.remove(&id);
        timers.cancel(id);
        true
    }

    /// Cancels a deadline by its timer handle.
    pub fn clear<E>(&mut self, id: TimerId, timers: &mut Timers<E>) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        self.by_key.remove(&entry.key);
        timers.cancel(id);
        true
    }

    /// Handles an expired deadline. Returns false for unknown handles.
    pub fn on_timeout(&mut self, id: TimerId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        self.by_key.remove(&entry.key);

        match entry.callback {
            Some(callback) => callback(entry.event, entry.message),
            None => warn!(
                topic = %entry.message.topic,
                action = %entry.message.action,
                name = entry.message.unique_name().unwrap_or(""),
                "{}",
                entry.event
            ),
        }
        true
    }

    /// Drops every deadline without invoking callbacks.
    pub fn on_connection_lost<E>(&mut self, timers: &mut Timers<E>) {
        if !self.entries.is_empty() {
            debug!(count = self.entries.len(), "connection lost, discarding timeouts");
        }
        for (id, _) in self.entries.drain() {
            timers.cancel(id);
        }
        self.by_key.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TimeoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeoutRegistry")
            .field("default_timeout", &self.default_timeout)
            .field("pending", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
