// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection states and the transition table between them.

use std::fmt;

use syncline_core::Transition;

/// Lifecycle state of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Closed,
    AwaitingConnection,
    Challenging,
    AwaitingAuthentication,
    Authenticating,
    Open,
    Reconnecting,
    Redirecting,
    Closing,
    Error,
    ChallengeDenied,
    TooManyAuthAttempts,
    ConnectionAuthenticationTimeout,
    Pausing,
    Offline,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Closed => "CLOSED",
            ConnectionState::AwaitingConnection => "AWAITING_CONNECTION",
            ConnectionState::Challenging => "CHALLENGING",
            ConnectionState::AwaitingAuthentication => "AWAITING_AUTHENTICATION",
            ConnectionState::Authenticating => "AUTHENTICATING",
            ConnectionState::Open => "OPEN",
            ConnectionState::Reconnecting => "RECONNECTING",
            ConnectionState::Redirecting => "REDIRECTING",
            ConnectionState::Closing => "CLOSING",
            ConnectionState::Error => "ERROR",
            ConnectionState::ChallengeDenied => "CHALLENGE_DENIED",
            ConnectionState::TooManyAuthAttempts => "TOO_MANY_AUTH_ATTEMPTS",
            ConnectionState::ConnectionAuthenticationTimeout => {
                "CONNECTION_AUTHENTICATION_TIMEOUT"
            }
            ConnectionState::Pausing => "PAUSING",
            ConnectionState::Offline => "OFFLINE",
        }
    }

    /// Returns true for states the server put us in and that no retry leaves.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConnectionState::ChallengeDenied
                | ConnectionState::TooManyAuthAttempts
                | ConnectionState::ConnectionAuthenticationTimeout
        )
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named transitions of the connection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionName {
    Connected,
    Challenge,
    ChallengeAccepted,
    ChallengeDenied,
    Redirected,
    Authenticate,
    AuthUnsuccessful,
    AuthSuccessful,
    TooManyAuthAttempts,
    AuthenticationTimeout,
    Error,
    Reconnect,
    Close,
    Closed,
    Pause,
    Offline,
    Resume,
}

/// Builds the connection's transition table.
pub fn transitions() -> Vec<Transition<ConnectionState, TransitionName>> {
    use ConnectionState as S;
    use TransitionName as T;

    vec![
        Transition::new(T::Connected, S::Closed, S::AwaitingConnection),
        Transition::new(T::Connected, S::Reconnecting, S::AwaitingConnection),
        Transition::new(T::Connected, S::Redirecting, S::AwaitingConnection),
        Transition::new(T::Challenge, S::AwaitingConnection, S::Challenging),
        Transition::new(T::ChallengeAccepted, S::Challenging, S::AwaitingAuthentication),
        Transition::new(T::ChallengeDenied, S::Challenging, S::ChallengeDenied),
        Transition::new(T::Redirected, S::AwaitingConnection, S::Redirecting),
        Transition::new(T::Redirected, S::Challenging, S::Redirecting),
        Transition::new(T::Redirected, S::AwaitingAuthentication, S::Redirecting),
        Transition::new(T::Redirected, S::Authenticating, S::Redirecting),
        Transition::new(T::Authenticate, S::AwaitingAuthentication, S::Authenticating),
        Transition::new(T::AuthUnsuccessful, S::Authenticating, S::AwaitingAuthentication),
        Transition::new(T::AuthSuccessful, S::Authenticating, S::Open),
        Transition::new(T::TooManyAuthAttempts, S::Authenticating, S::TooManyAuthAttempts),
        Transition::new(T::TooManyAuthAttempts, S::AwaitingAuthentication, S::TooManyAuthAttempts),
        Transition::new(
            T::AuthenticationTimeout,
            S::AwaitingConnection,
            S::ConnectionAuthenticationTimeout,
        ),
        Transition::new(
            T::AuthenticationTimeout,
            S::AwaitingAuthentication,
            S::ConnectionAuthenticationTimeout,
        ),
        Transition::new(
            T::AuthenticationTimeout,
            S::Authenticating,
            S::ConnectionAuthenticationTimeout,
        ),
        Transition::any(T::Error, S::Error),
        Transition::any(T::Reconnect, S::Reconnecting),
        Transition::any(T::Close, S::Closing),
        Transition::any(T::Closed, S::Closed),
        Transition::any(T::Pause, S::Pausing),
        Transition::new(T::Offline, S::Pausing, S::Offline),
        Transition::any(T::Resume, S::Reconnecting),
    ]
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
