// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Finite state machine with named transitions.
//!
//! A machine is built from a fixed list of [`Transition`]s. Requesting a
//! transition scans the list for the first entry with the requested name whose
//! `from` state matches the current state (a `from` of `None` matches any
//! state). A request that matches nothing is a programming error and is
//! returned as [`Error::InvalidTransition`].

use std::fmt;

use crate::error::{Error, Result};

/// Callback run after a transition is taken.
pub type TransitionHandler = Box<dyn FnMut() + Send>;

/// Observer invoked with `(new, old)` on every successful transition.
pub type StateObserver<S> = Box<dyn FnMut(S, S) + Send>;

/// A named edge between two states.
pub struct Transition<S, N> {
    pub name: N,
    /// Required current state, or `None` for any state.
    pub from: Option<S>,
    pub to: S,
    pub handler: Option<TransitionHandler>,
}

impl<S, N> Transition<S, N> {
    /// Creates a transition that only applies in state `from`.
    pub fn new(name: N, from: S, to: S) -> Self {
        Transition { name, from: Some(from), to, handler: None }
    }

    /// Creates a transition that applies in every state.
    pub fn any(name: N, to: S) -> Self {
        Transition { name, from: None, to, handler: None }
    }

    /// Attaches a handler run after the transition is taken.
    pub fn with_handler(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }
}

impl<S: fmt::Debug, N: fmt::Debug> fmt::Debug for Transition<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// The result of a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change<S> {
    pub from: S,
    pub to: S,
}

/// A state machine over states `S` with transitions named by `N`.
pub struct StateMachine<S, N> {
    state: S,
    transitions: Vec<Transition<S, N>>,
    on_state_changed: Option<StateObserver<S>>,
    in_end_state: bool,
}

impl<S, N> StateMachine<S, N>
where
    S: Copy + PartialEq + fmt::Debug,
    N: PartialEq + fmt::Debug,
{
    /// Creates a machine in `initial` with a fixed transition table.
    pub fn new(initial: S, transitions: Vec<Transition<S, N>>) -> Self {
        StateMachine { state: initial, transitions, on_state_changed: None, in_end_state: false }
    }

    /// Sets the observer invoked with `(new, old)` on every transition.
    pub fn with_observer(mut self, observer: impl FnMut(S, S) + Send + 'static) -> Self {
        self.on_state_changed = Some(Box::new(observer));
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> S {
        self.state
    }

    /// Returns true once the machine has been marked terminal.
    pub fn in_end_state(&self) -> bool {
        self.in_end_state
    }

    /// Marks the machine as terminal (or clears the mark on reset).
    pub fn set_in_end_state(&mut self, terminal: bool) {
        self.in_end_state = terminal;
    }

    /// Returns true if a transition named `name` applies in the current state.
    pub fn can(&self, name: &N) -> bool {
        let current = self.state;
        self.transitions.iter().any(|t| t.name == *name && t.from.map_or(true, |f| f == current))
    }

    /// Takes the transition named `name`.
    ///
    /// The observer runs before the transition's own handler.
    pub fn transition(&mut self, name: N) -> Result<Change<S>> {
        let current = self.state;
        let Some(transition) = self
            .transitions
            .iter_mut()
            .find(|t| t.name == name && t.from.map_or(true, |f| f == current))
        else {
            return Err(Error::InvalidTransition {
                transition: format!("{name:?}"),
                state: format!("{current:?}"),
            });
        };

        let to = transition.to;
        self.state = to;
        if let Some(observer) = self.on_state_changed.as_mut() {
            observer(to, current);
        }
        if let Some(handler) = transition.handler.as_mut() {
            handler();
        }

        Ok(Change { from: current, to })
    }
}

impl<S: fmt::Debug, N> fmt::Debug for StateMachine<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("state", &self.state)
            .field("transitions", &self.transitions.len())
            .field("in_end_state", &self.in_end_state)
            .finish()
    }
}

#[cfg(test)]
#[path = "fsm_tests.rs"]
mod tests;
