// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Timer service for delayed events.
//!
//! [`Timers`] keeps every scheduled event ordered by deadline. It never sleeps
//! or spawns anything itself: the owner asks for [`Timers::next_deadline`],
//! waits however it likes, and then drains due events with
//! [`Timers::pop_expired`]. Time comes from a [`Clock`], so tests can drive
//! everything with a [`ManualClock`].

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of monotonic time, measured from an arbitrary origin.
///
/// This allows injecting a manual clock for testing.
pub trait Clock: Send + Sync {
    /// Returns the time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Monotonic clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is the current instant.
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }

    /// Converts a clock reading back into an `Instant`.
    pub fn instant_at(&self, at: Duration) -> Instant {
        self.origin + at
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    /// Creates a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current reading.
    pub fn set(&self, at: Duration) {
        self.now_ms.store(at.as_millis() as u64, Ordering::SeqCst);
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Handle to a scheduled event. Handles are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Returns the raw handle value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Scheduled events of type `E`, ordered by deadline then by schedule order.
pub struct Timers<E> {
    clock: Arc<dyn Clock>,
    next_id: u64,
    queue: BTreeMap<(Duration, TimerId), E>,
    deadlines: HashMap<TimerId, Duration>,
}

impl<E> Timers<E> {
    /// Creates an empty timer set reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Timers { clock, next_id: 0, queue: BTreeMap::new(), deadlines: HashMap::new() }
    }

    /// Returns the clock's current reading.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Schedules `event` to fire after `delay`.
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = self.now() + delay;
        self.queue.insert((deadline, id), event);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancels a pending timer, returning its event if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<E> {
        let deadline = self.deadlines.remove(&id)?;
        self.queue.remove(&(deadline, id))
    }

    /// Returns true if `id` is scheduled and has not fired.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Returns the deadline of the timer `id`, if pending.
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.deadlines.get(&id).copied()
    }

    /// Returns the earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer whose deadline has passed.
    ///
    /// Call repeatedly until it returns `None`; handling one event may
    /// schedule or cancel others.
    pub fn pop_expired(&mut self) -> Option<(TimerId, E)> {
        let now = self.now();
        let (&(deadline, id), _) = self.queue.iter().next()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.queue.remove(&(deadline, id)).map(|event| (id, event))
    }

    /// Returns the number of pending timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<E> std::fmt::Debug for Timers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers").field("pending", &self.queue.len()).finish()
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
