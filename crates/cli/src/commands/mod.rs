// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod connect;

use std::path::Path;

use syncline::Options;

use crate::error::Result;

/// Options from `path`, or the defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> Result<Options> {
    match path {
        Some(path) => Ok(Options::load(path)?),
        None => Ok(Options::default()),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
