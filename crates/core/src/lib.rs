// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! syncline-core: Shared primitives for the syncline client
//!
//! This crate provides the message model exchanged with the sync server, a
//! small finite state machine engine, and the timer service used to schedule
//! heartbeats, reconnects and acknowledgement deadlines.

pub mod error;
pub mod fsm;
pub mod message;
pub mod timer;

pub use error::{Error, Result};
pub use fsm::{Change, StateMachine, Transition};
pub use message::{Action, Message, Topic};
pub use timer::{Clock, ManualClock, SystemClock, TimerId, Timers};
