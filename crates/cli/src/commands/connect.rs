// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use syncline::{Client, ClientEvent, Options};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::load_options;
use crate::cli::ConnectArgs;
use crate::colors;
use crate::display;
use crate::error::{Error, Result};

pub async fn run(args: ConnectArgs) -> Result<()> {
    let options = build_options(&args)?;
    let client = Client::connect(&args.url, options)?;
    info!("Connecting to {}", args.url);

    let mut events = client.events();
    let colorize = colors::should_colorize();

    if let Some(params) = args.auth {
        let auth = client.clone();
        tokio::spawn(async move {
            match auth.authenticate(params).await {
                Ok(data) => println!("{}", display::login(data.as_ref())),
                Err(e) => warn!("Authentication failed: {}", e),
            }
        });
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    println!("{}", display::event(&event, colorize));
                    if let Some(reason) = final_reason(&event) {
                        return Err(reason);
                    }
                }
                Err(RecvError::Lagged(n)) => warn!("Skipped {} events", n),
                Err(RecvError::Closed) => return Err(syncline::Error::ClientGone.into()),
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing connection");
                client.close().await?;
                return Ok(());
            }
        }
    }
}

fn build_options(args: &ConnectArgs) -> Result<Options> {
    let mut options = load_options(args.config.as_deref())?;
    if let Some(max) = args.max_attempts {
        options.max_reconnect_attempts = max;
    }
    if let Some(path) = &args.path {
        options.path = path.clone();
    }
    Ok(options)
}

/// Events after which the connection will not come back by itself.
pub(crate) fn final_reason(event: &ClientEvent) -> Option<Error> {
    match event {
        ClientEvent::StateChanged(state) if state.is_terminal() => Some(Error::Ended(*state)),
        ClientEvent::MaxReconnectionAttemptsReached(attempts) => Some(Error::GaveUp(*attempts)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "connect_tests.rs"]
mod tests;
