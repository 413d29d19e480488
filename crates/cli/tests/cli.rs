// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the `syncline` binary.

#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn syncline() -> Command {
    let mut cmd = cargo_bin_cmd!("syncline");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    syncline()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("connect"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn unsupported_scheme_fails() {
    syncline()
        .args(["connect", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn malformed_auth_is_rejected() {
    syncline()
        .args(["connect", "localhost", "--auth", "{nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn config_prints_defaults() {
    syncline()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("heartbeat_interval_ms = 30000"));
}

#[test]
fn config_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("syncline.toml");
    std::fs::write(&path, "max_reconnect_attempts = 2\n").unwrap();

    syncline()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_reconnect_attempts = 2"));
}

#[test]
fn invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("syncline.toml");
    std::fs::write(&path, "heartbeat_interval_ms = 0\n").unwrap();

    syncline().args(["config", "-c"]).arg(&path).assert().failure();
}

#[test]
fn gives_up_when_server_is_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    syncline()
        .args(["connect", &format!("127.0.0.1:{port}"), "--max-attempts", "1"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stdout(predicate::str::contains("state: RECONNECTING"))
        .stdout(predicate::str::contains("gave up after 1 reconnection attempts"));
}
