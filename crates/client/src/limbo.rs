// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Short-term buffering across connection drops.
//!
//! When an open connection is lost the client enters a limbo window. Work
//! submitted during the window is held instead of failing, and is either
//! resubmitted when the connection comes back or failed as offline when the
//! window expires, whichever happens first.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use syncline_core::{TimerId, Timers};
use tracing::debug;

use crate::state::ConnectionState;

/// Items held during a limbo window.
pub struct LimboBuffer<T> {
    window: Duration,
    queue: VecDeque<T>,
    timer: Option<TimerId>,
}

impl<T> LimboBuffer<T> {
    pub fn new(window: Duration) -> Self {
        LimboBuffer { window, queue: VecDeque::new(), timer: None }
    }

    /// Returns true while the window is open.
    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Opens the window and arms its expiry timer.
    ///
    /// Returns false if the window was already open; the original expiry
    /// stands.
    pub fn enter<E>(&mut self, timers: &mut Timers<E>, event: E) -> bool {
        if self.timer.is_some() {
            return false;
        }
        debug!(window_ms = self.window.as_millis() as u64, "entering limbo");
        self.timer = Some(timers.schedule(self.window, event));
        true
    }

    /// Queues `item` while the window is open, otherwise hands it back.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_active() {
            self.queue.push_back(item);
            Ok(())
        } else {
            Err(item)
        }
    }

    /// Closes the window early and returns the held items in order.
    pub fn flush<E>(&mut self, timers: &mut Timers<E>) -> Vec<T> {
        if let Some(id) = self.timer.take() {
            timers.cancel(id);
        }
        self.queue.drain(..).collect()
    }

    /// Handles the expiry timer `id`, returning the held items.
    ///
    /// Stale timer handles return nothing.
    pub fn expire(&mut self, id: TimerId) -> Vec<T> {
        if self.timer != Some(id) {
            return Vec::new();
        }
        self.timer = None;
        debug!(held = self.queue.len(), "limbo window expired");
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> fmt::Debug for LimboBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimboBuffer")
            .field("window", &self.window)
            .field("active", &self.is_active())
            .field("held", &self.queue.len())
            .finish()
    }
}

/// Detects the moment a lost connection is reestablished.
///
/// Fires once per loss and restore cycle. The first time the connection
/// opens is not a restore.
pub struct ResubscribeNotifier {
    connected: bool,
    lost: bool,
    callback: Option<Box<dyn FnMut() + Send>>,
}

impl ResubscribeNotifier {
    pub fn new() -> Self {
        ResubscribeNotifier { connected: false, lost: false, callback: None }
    }

    /// Sets a callback run whenever [`observe`](Self::observe) fires.
    pub fn with_callback(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Feeds a new state. Returns true when it completes a restore.
    pub fn observe(&mut self, state: ConnectionState) -> bool {
        let open = state == ConnectionState::Open;
        if open && !self.connected {
            self.connected = true;
            if self.lost {
                self.lost = false;
                if let Some(callback) = self.callback.as_mut() {
                    callback();
                }
                return true;
            }
        } else if !open && self.connected {
            self.connected = false;
            self.lost = true;
        }
        false
    }
}

impl Default for ResubscribeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResubscribeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResubscribeNotifier")
            .field("connected", &self.connected)
            .field("lost", &self.lost)
            .finish()
    }
}

#[cfg(test)]
#[path = "limbo_tests.rs"]
mod tests;
