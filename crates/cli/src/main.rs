// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use syncline_cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = syncline_cli::logging::init(cli.verbose) {
        eprintln!("warning: {}", e);
    }
    if let Err(e) = syncline_cli::run(cli.command).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
