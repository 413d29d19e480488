// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! syncline_cli - command-line front end for the syncline client.
//!
//! `syncline connect` opens a connection, optionally logs in, and prints one
//! line per connection event until the connection ends for good or the user
//! interrupts it.

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod error;
pub mod help;
pub mod logging;

pub use cli::{Cli, Command, ConnectArgs};
pub use error::{Error, Result};

pub async fn run(command: Command) -> Result<()> {
    match command {
        Command::Connect(args) => commands::connect::run(args).await,
        Command::Config { config } => commands::config::run(config.as_deref()),
    }
}
