// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal color utilities for help and event output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use syncline::ConnectionState;

/// ANSI 256-color codes
pub mod codes {
    /// Section headers: pastel cyan/steel blue
    pub const HEADER: u8 = 74;
    /// Commands/literals: light grey
    pub const LITERAL: u8 = 250;
    /// Default values/context: medium grey
    pub const CONTEXT: u8 = 245;
    /// Open connection
    pub const GOOD: u8 = 114;
    /// Handshake, reconnect and other passing states
    pub const PENDING: u8 = 179;
    /// Errors and end states
    pub const BAD: u8 = 167;
}

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if std::env::var("NO_COLOR").is_ok_and(|v| v == "1") {
        return false;
    }
    if std::env::var("COLOR").is_ok_and(|v| v == "1") {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn fg256(code: u8) -> String {
    format!("\x1b[38;5;{code}m")
}

const RESET: &str = "\x1b[0m";

fn paint(code: u8, text: &str) -> String {
    format!("{}{}{}", fg256(code), text, RESET)
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

pub fn bad(text: &str) -> String {
    paint(codes::BAD, text)
}

/// Color code for a connection state.
pub fn state_code(state: ConnectionState) -> u8 {
    match state {
        ConnectionState::Open => codes::GOOD,
        ConnectionState::Error | ConnectionState::Closed => codes::BAD,
        s if s.is_terminal() => codes::BAD,
        _ => codes::PENDING,
    }
}

pub fn state(state: ConnectionState) -> String {
    paint(state_code(state), state.as_str())
}

/// Colorize an examples help block.
///
/// Lines ending with `:` become headers. In `  command    description`
/// lines the command is painted as a literal.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() + 128);
    for line in text.lines() {
        if !result.is_empty() {
            result.push('\n');
        }

        let trimmed = line.trim_start();
        let indent = &line[..line.len() - trimmed.len()];

        if trimmed.ends_with(':') && !trimmed.contains("  ") {
            result.push_str(indent);
            result.push_str(&header(trimmed));
            continue;
        }

        match trimmed.find("  ") {
            Some(end) => {
                result.push_str(indent);
                result.push_str(&literal(&trimmed[..end]));
                result.push_str(&trimmed[end..]);
            }
            None if !trimmed.is_empty() => {
                result.push_str(indent);
                result.push_str(&literal(trimmed));
            }
            None => result.push_str(line),
        }
    }
    result
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
