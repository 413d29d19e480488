// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use syncline::ConnectionState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] syncline::Error),

    #[error("connection ended in state {0}")]
    Ended(ConnectionState),

    #[error("gave up after {0} reconnection attempts")]
    GaveUp(u32),

    #[error("failed to render options: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
