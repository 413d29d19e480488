// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection options.
//!
//! Options can be built in code (`Options { .. Options::default() }`) or
//! loaded from a TOML file:
//!
//! ```toml
//! heartbeat_interval_ms = 30000
//! max_reconnect_attempts = 5
//! offline_buffer_timeout_ms = 2000
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options recognised by the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Milliseconds between heartbeat checks. The connection is considered
    /// dead after twice this long without a server ping.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
    /// Added to the reconnect delay for every failed attempt.
    #[serde(default = "default_reconnect_interval_increment_ms")]
    pub reconnect_interval_increment_ms: u64,
    /// Upper bound on the reconnect delay.
    #[serde(default = "default_max_reconnect_interval_ms")]
    pub max_reconnect_interval_ms: u64,
    /// Reconnect attempts before giving up for good.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Default deadline for acks and responses.
    #[serde(default = "default_subscription_timeout_ms")]
    pub subscription_timeout_ms: u64,
    /// How long operations are buffered after the connection drops.
    #[serde(default = "default_offline_buffer_timeout_ms")]
    pub offline_buffer_timeout_ms: u64,
    /// Path appended to URLs given without one.
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_reconnect_interval_increment_ms() -> u64 {
    4_000
}

fn default_max_reconnect_interval_ms() -> u64 {
    180_000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_subscription_timeout_ms() -> u64 {
    2_000
}

fn default_offline_buffer_timeout_ms() -> u64 {
    2_000
}

fn default_path() -> String {
    "/sync".to_string()
}

impl Default for Options {
    fn default() -> Self {
        Options {
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            reconnect_interval_increment_ms: default_reconnect_interval_increment_ms(),
            max_reconnect_interval_ms: default_max_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            subscription_timeout_ms: default_subscription_timeout_ms(),
            offline_buffer_timeout_ms: default_offline_buffer_timeout_ms(),
            path: default_path(),
        }
    }
}

impl Options {
    /// Loads options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses options from TOML text and validates them.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: Options = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Rejects values the connection cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.heartbeat_interval_ms == 0 {
            return Err(Error::Config("heartbeat_interval_ms must be > 0".to_string()));
        }
        if self.max_reconnect_interval_ms == 0 {
            return Err(Error::Config("max_reconnect_interval_ms must be > 0".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(Error::Config(format!("path '{}' must start with '/'", self.path)));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn subscription_timeout(&self) -> Duration {
        Duration::from_millis(self.subscription_timeout_ms)
    }

    pub fn offline_buffer_timeout(&self) -> Duration {
        Duration::from_millis(self.offline_buffer_timeout_ms)
    }

    /// Delay before reconnect attempt number `attempt` (starting at 0).
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        let delay = self.reconnect_interval_increment_ms.saturating_mul(u64::from(attempt));
        Duration::from_millis(delay.min(self.max_reconnect_interval_ms))
    }
}

/// Normalizes a server URL.
///
/// A URL without a scheme gets `ws://`; a URL without a path gets `path`.
/// Schemes other than `ws://` and `wss://` are rejected.
pub fn normalize_url(url: &str, path: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::Config("server URL is empty".to_string()));
    }

    let (scheme, rest) = match url.split_once("://") {
        Some((scheme @ ("ws" | "wss"), rest)) => (scheme, rest),
        Some((scheme, _)) => {
            return Err(Error::Config(format!(
                "invalid URL '{url}': unsupported scheme '{scheme}', must be ws:// or wss://"
            )))
        }
        None => ("ws", url),
    };

    if rest.is_empty() || rest.starts_with('/') {
        return Err(Error::Config(format!("invalid URL '{url}': missing host")));
    }

    if rest.contains('/') {
        Ok(format!("{scheme}://{rest}"))
    } else {
        Ok(format!("{scheme}://{rest}{path}"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
