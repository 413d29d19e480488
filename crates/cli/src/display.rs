// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-line rendering of connection events.

use serde_json::Value;
use syncline::ClientEvent;

use crate::colors;

/// Renders `event` as a single line, colored when `colorize` is set.
pub fn event(event: &ClientEvent, colorize: bool) -> String {
    match event {
        ClientEvent::StateChanged(state) => {
            let name = if colorize { colors::state(*state) } else { state.as_str().to_string() };
            format!("state: {name}")
        }
        ClientEvent::MaxReconnectionAttemptsReached(attempts) => {
            let text = format!("gave up after {attempts} reconnection attempts");
            format!("error: {}", paint_bad(&text, colorize))
        }
        ClientEvent::ReauthenticationFailure(reason) => {
            format!("error: {}", paint_bad(&format!("re-authentication failed: {reason}"), colorize))
        }
        ClientEvent::ClientDataChanged(data) => format!("client data: {}", data_text(data.as_ref())),
        ClientEvent::Error(err) => format!("error: {}", paint_bad(&err.to_string(), colorize)),
    }
}

/// Line printed when a login succeeds.
pub fn login(data: Option<&Value>) -> String {
    format!("authenticated: {}", data_text(data))
}

fn data_text(data: Option<&Value>) -> String {
    data.map_or_else(|| "(no data)".to_string(), Value::to_string)
}

fn paint_bad(text: &str, colorize: bool) -> String {
    if colorize {
        colors::bad(text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
