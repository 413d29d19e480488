// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use clap::CommandFactory;
use serde_json::json;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("syncline").chain(args.iter().copied()))
}

#[test]
fn command_definition_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn connect_parses_auth_json() {
    let cli = parse(&["connect", "localhost:6020", "--auth", r#"{"user":"ana"}"#]).unwrap();
    let Command::Connect(args) = cli.command else {
        panic!("expected connect");
    };
    assert_eq!(args.url, "localhost:6020");
    assert_eq!(args.auth, Some(json!({"user": "ana"})));
    assert!(!cli.verbose);
}

#[test]
fn connect_rejects_malformed_auth() {
    assert!(parse(&["connect", "localhost", "--auth", "{user"]).is_err());
}

#[parameterized(
    before = { &["-v", "connect", "localhost"] },
    after = { &["connect", "localhost", "--verbose"] },
)]
fn verbose_is_global(args: &[&str]) {
    assert!(parse(args).unwrap().verbose);
}

#[test]
fn connect_overrides() {
    let cli = parse(&["connect", "h", "--max-attempts", "2", "--path", "/x", "-c", "a.toml"]).unwrap();
    let Command::Connect(args) = cli.command else {
        panic!("expected connect");
    };
    assert_eq!(args.max_attempts, Some(2));
    assert_eq!(args.path.as_deref(), Some("/x"));
    assert_eq!(args.config, Some(PathBuf::from("a.toml")));
}

#[test]
fn url_is_required() {
    assert!(parse(&["connect"]).is_err());
}
