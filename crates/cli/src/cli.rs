// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use crate::help;

const EXAMPLES_HELP: &str = "\
Examples:
  syncline connect localhost:6020                 Connect and watch events
  syncline connect wss://sync.example.com --auth '{\"token\":\"abc\"}'
  syncline config --config syncline.toml          Show effective options";

#[derive(Parser)]
#[command(name = "syncline")]
#[command(version)]
#[command(about = "Resilient client for a real-time sync server")]
#[command(styles = help::styles())]
#[command(after_help = help::examples(EXAMPLES_HELP))]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to a server and report connection events until it ends
    Connect(ConnectArgs),

    /// Print the effective connection options as TOML
    Config {
        /// Options file to load
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct ConnectArgs {
    /// Server URL; `ws://` and the default path are added when missing
    pub url: String,

    /// Options file to load
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Authentication parameters as JSON
    #[arg(short, long, value_parser = parse_json)]
    pub auth: Option<Value>,

    /// Override the reconnect attempt limit
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Override the path added to URLs without one
    #[arg(long)]
    pub path: Option<String>,
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
