// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Messages exchanged with the sync server.
//!
//! Every message carries a [`Topic`] naming the feature channel it belongs to
//! and an [`Action`] within that channel. The `CONNECTION` and `AUTH` topics
//! belong to the connection itself; all other topics are routed to the
//! handler registered for them.
//!
//! On the wire each message is one JSON object per text frame.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Feature channel a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Topic {
    Connection,
    Auth,
    Event,
    Record,
    Rpc,
    Presence,
}

impl Topic {
    /// Returns the wire name of the topic.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Connection => "CONNECTION",
            Topic::Auth => "AUTH",
            Topic::Event => "EVENT",
            Topic::Record => "RECORD",
            Topic::Rpc => "RPC",
            Topic::Presence => "PRESENCE",
        }
    }

    /// Returns true for topics consumed by the connection and never forwarded.
    pub fn is_internal(self) -> bool {
        matches!(self, Topic::Connection | Topic::Auth)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action within a topic.
///
/// Actions are shared across topics: `REQUEST` is both the authentication
/// request and a remote call, `ACCEPT` is both a handshake acceptance and a
/// remote call acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // Connection
    Challenge,
    ChallengeResponse,
    Accept,
    Rejection,
    Redirect,
    Ping,
    Pong,
    Closing,
    AuthenticationTimeout,

    // Auth
    Request,
    AuthSuccessful,
    AuthUnsuccessful,
    TooManyAuthAttempts,

    // Features
    Subscribe,
    Unsubscribe,
    Listen,
    Unlisten,
    Emit,
    Read,
    ReadResponse,
    Head,
    HeadResponse,
    CreateAndUpdate,
    WriteAcknowledgement,
    Delete,
    DeleteSuccess,
    Deleted,
    Provide,
    Unprovide,
    Response,
    RequestError,
    Query,
    QueryResponse,
    QueryAll,
    QueryAllResponse,
    MessageDenied,
}

impl Action {
    /// Returns the wire name of the action.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Challenge => "CHALLENGE",
            Action::ChallengeResponse => "CHALLENGE_RESPONSE",
            Action::Accept => "ACCEPT",
            Action::Rejection => "REJECTION",
            Action::Redirect => "REDIRECT",
            Action::Ping => "PING",
            Action::Pong => "PONG",
            Action::Closing => "CLOSING",
            Action::AuthenticationTimeout => "AUTHENTICATION_TIMEOUT",
            Action::Request => "REQUEST",
            Action::AuthSuccessful => "AUTH_SUCCESSFUL",
            Action::AuthUnsuccessful => "AUTH_UNSUCCESSFUL",
            Action::TooManyAuthAttempts => "TOO_MANY_AUTH_ATTEMPTS",
            Action::Subscribe => "SUBSCRIBE",
            Action::Unsubscribe => "UNSUBSCRIBE",
            Action::Listen => "LISTEN",
            Action::Unlisten => "UNLISTEN",
            Action::Emit => "EMIT",
            Action::Read => "READ",
            Action::ReadResponse => "READ_RESPONSE",
            Action::Head => "HEAD",
            Action::HeadResponse => "HEAD_RESPONSE",
            Action::CreateAndUpdate => "CREATE_AND_UPDATE",
            Action::WriteAcknowledgement => "WRITE_ACKNOWLEDGEMENT",
            Action::Delete => "DELETE",
            Action::DeleteSuccess => "DELETE_SUCCESS",
            Action::Deleted => "DELETED",
            Action::Provide => "PROVIDE",
            Action::Unprovide => "UNPROVIDE",
            Action::Response => "RESPONSE",
            Action::RequestError => "REQUEST_ERROR",
            Action::Query => "QUERY",
            Action::QueryResponse => "QUERY_RESPONSE",
            Action::QueryAll => "QUERY_ALL",
            Action::QueryAllResponse => "QUERY_ALL_RESPONSE",
            Action::MessageDenied => "MESSAGE_DENIED",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a response action to the action of the request that produced it.
///
/// Actions that are not responses map to themselves, which is also how
/// acknowledgements (same action, `is_ack` set) are matched.
pub fn request_action_for(topic: Topic, action: Action) -> Action {
    match (topic, action) {
        (Topic::Record, Action::ReadResponse) => Action::Read,
        (Topic::Record, Action::HeadResponse) => Action::Head,
        (Topic::Record, Action::DeleteSuccess | Action::Deleted) => Action::Delete,
        (Topic::Record, Action::WriteAcknowledgement) => Action::CreateAndUpdate,
        (
            Topic::Rpc,
            Action::Accept | Action::Response | Action::Rejection | Action::RequestError,
        ) => Action::Request,
        (Topic::Presence, Action::QueryResponse) => Action::Query,
        (Topic::Presence, Action::QueryAllResponse) => Action::QueryAll,
        (_, action) => action,
    }
}

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub topic: Topic,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Raw payload, as received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_ack: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,
    /// Action of the request an error or ack refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_action: Option<Action>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Message {
    /// Creates a message with only a topic and action.
    pub fn new(topic: Topic, action: Action) -> Self {
        Message {
            topic,
            action,
            name: None,
            correlation_id: None,
            data: None,
            parsed_data: None,
            is_ack: false,
            is_error: false,
            original_action: None,
        }
    }

    /// Sets the name (record name, event name, rpc name).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the correlation identifier.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Sets the raw payload.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the structured payload.
    pub fn with_parsed_data(mut self, data: Value) -> Self {
        self.parsed_data = Some(data);
        self
    }

    /// Marks the message as an acknowledgement.
    pub fn ack(mut self) -> Self {
        self.is_ack = true;
        self
    }

    /// Marks the message as an error reply to a request with `original` action.
    pub fn error_for(mut self, original: Action) -> Self {
        self.is_error = true;
        self.original_action = Some(original);
        self
    }

    /// The identifier used to tell apart concurrent operations on one topic:
    /// the correlation id when present, otherwise the name.
    pub fn unique_name(&self) -> Option<&str> {
        self.correlation_id.as_deref().or(self.name.as_deref())
    }

    /// The action of the request this message answers.
    pub fn request_action(&self) -> Action {
        self.original_action.unwrap_or_else(|| request_action_for(self.topic, self.action))
    }

    /// Returns true if this message answers an earlier request.
    pub fn is_response(&self) -> bool {
        self.is_ack || self.original_action.is_some() || self.request_action() != self.action
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
