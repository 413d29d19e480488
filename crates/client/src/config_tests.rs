// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn defaults() {
    let options = Options::default();
    assert_eq!(options.heartbeat_interval(), Duration::from_secs(30));
    assert_eq!(options.max_reconnect_attempts, 5);
    assert_eq!(options.subscription_timeout(), Duration::from_secs(2));
    assert_eq!(options.offline_buffer_timeout(), Duration::from_secs(2));
    assert_eq!(options.path, "/sync");
    options.validate().unwrap();
}

#[test]
fn partial_toml_keeps_defaults() {
    let options = Options::from_toml_str(
        r#"
        heartbeat_interval_ms = 15
        max_reconnect_attempts = 3
        "#,
    )
    .unwrap();

    assert_eq!(options.heartbeat_interval_ms, 15);
    assert_eq!(options.max_reconnect_attempts, 3);
    assert_eq!(options.reconnect_interval_increment_ms, 4_000);
}

#[test]
fn load_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("syncline.toml");
    fs::write(&path, "offline_buffer_timeout_ms = 20\npath = \"/rt\"\n").unwrap();

    let options = Options::load(&path).unwrap();
    assert_eq!(options.offline_buffer_timeout_ms, 20);
    assert_eq!(options.path, "/rt");
}

#[test]
fn load_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let err = Options::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn malformed_toml_is_rejected() {
    let err = Options::from_toml_str("heartbeat_interval_ms = \"often\"").unwrap_err();
    assert!(matches!(err, Error::Toml(_)));
}

#[parameterized(
    zero_heartbeat = { "heartbeat_interval_ms = 0", "heartbeat" },
    zero_max_interval = { "max_reconnect_interval_ms = 0", "max_reconnect_interval" },
    relative_path = { "path = \"sync\"", "path" },
)]
fn invalid_options(toml: &str, expected: &str) {
    let err = Options::from_toml_str(toml).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains(expected), "{err}");
}

#[parameterized(
    first = { 0, 0 },
    second = { 1, 20 },
    third = { 2, 40 },
    capped = { 10, 150 },
)]
fn reconnect_delay_grows_linearly_up_to_cap(attempt: u32, expected_ms: u64) {
    let options = Options {
        reconnect_interval_increment_ms: 20,
        max_reconnect_interval_ms: 150,
        ..Options::default()
    };
    assert_eq!(options.reconnect_delay(attempt), Duration::from_millis(expected_ms));
}

#[parameterized(
    bare_host = { "localhost:6020", "ws://localhost:6020/sync" },
    ws_no_path = { "ws://localhost:6020", "ws://localhost:6020/sync" },
    wss_with_path = { "wss://example.com/rt", "wss://example.com/rt" },
    trims = { "  ws://a:1/x  ", "ws://a:1/x" },
)]
fn normalize_valid_urls(input: &str, expected: &str) {
    assert_eq!(normalize_url(input, "/sync").unwrap(), expected);
}

#[parameterized(
    empty = { "" },
    http = { "http://example.com" },
    no_host = { "ws://" },
    path_only = { "/sync" },
)]
fn normalize_invalid_urls(input: &str) {
    assert!(matches!(normalize_url(input, "/sync"), Err(Error::Config(_))));
}
