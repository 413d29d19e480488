// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use syncline::Options;

use super::load_options;
use crate::error::Result;

pub fn run(config: Option<&Path>) -> Result<()> {
    let options = load_options(config)?;
    print!("{}", render(&options)?);
    Ok(())
}

pub(crate) fn render(options: &Options) -> Result<String> {
    Ok(toml::to_string(options)?)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
