// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for syncline-core operations.

use thiserror::Error;

/// All possible errors that can occur in syncline-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid transition '{transition}' from state {state}\n  hint: no transition with that name starts from the current state")]
    InvalidTransition { transition: String, state: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for syncline-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
