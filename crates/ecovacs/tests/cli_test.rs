//! Integration tests for the `ecovacs` CLI binary.
//!
//! Argument parsing, help output, completions, and error exit codes, plus a
//! few end-to-end runs against a wiremock stand-in for the cloud.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use chrono::{TimeDelta, Utc};
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ecovacs` binary with env isolation.
///
/// Clears all `ECOVACS_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn ecovacs_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ecovacs");
    cmd.env("HOME", "/tmp/ecovacs-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ecovacs-cli-test-nonexistent")
        .env_remove("ECOVACS_PROFILE")
        .env_remove("ECOVACS_API_URL")
        .env_remove("ECOVACS_API_KEY")
        .env_remove("ECOVACS_ISSUED_AT")
        .env_remove("ECOVACS_OUTPUT")
        .env_remove("ECOVACS_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn issued_days_ago(days: i64) -> String {
    (Utc::now() - TimeDelta::days(days)).to_rfc3339()
}

fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": 0, "msg": "success", "data": data }))
}

fn ctl_ok(fields: Value) -> ResponseTemplate {
    let mut data = json!({ "ret": "ok" });
    if let (Some(target), Some(extra)) = (data.as_object_mut(), fields.as_object()) {
        target.extend(extra.clone());
    }
    envelope(json!({ "code": 0, "msg": "ok", "data": { "ctl": { "data": data } } }))
}

async fn stub_cloud() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robot/deviceList"))
        .respond_with(envelope(json!([
            { "nickName": "Hall", "name": "Hall bot", "model": "DEEBOT N8" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/robot/ctl"))
        .and(body_partial_json(json!({ "cmd": "GetCleanState" })))
        .respond_with(ctl_ok(json!({ "st": "s" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/robot/ctl"))
        .and(body_partial_json(json!({ "cmd": "GetChargeState" })))
        .respond_with(ctl_ok(json!({ "type": "Idle", "power": 77 })))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let mut cmd = ecovacs_cmd();
    cmd.args([
        "--api-url",
        &server.uri(),
        "--api-key",
        "test-ak",
        "--issued-at",
        &issued_days_ago(1),
    ])
    .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ecovacs_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    ecovacs_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("robot vacuums")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("clean"))
            .and(predicate::str::contains("dock"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    ecovacs_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ecovacs"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    ecovacs_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    ecovacs_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = ecovacs_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_devices_list_without_config() {
    ecovacs_cmd()
        .args(["devices", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_expired_key_exits_with_auth_code() {
    let output = ecovacs_cmd()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "--api-key",
            "old-ak",
            "--issued-at",
            &issued_days_ago(91),
            "devices",
            "list",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("expired"), "Expected expiry message:\n{text}");
}

#[test]
fn test_key_without_issue_time_is_usage_error() {
    ecovacs_cmd()
        .args(["--api-key", "some-ak", "devices", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("issued_at"));
}

#[test]
fn test_zero_timeout_is_usage_error() {
    ecovacs_cmd()
        .args([
            "--api-key",
            "some-ak",
            "--issued-at",
            &issued_days_ago(1),
            "--timeout",
            "0",
            "devices",
            "list",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout"));
}

#[test]
fn test_config_path() {
    ecovacs_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Against a stubbed cloud ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json() {
    let server = stub_cloud().await;

    let output = run_against(&server, &["-o", "json", "devices", "list"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let devices: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["id"], "Hall");
    assert_eq!(devices[0]["status"], "cleaning");
    assert_eq!(devices[0]["battery"], 77);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_get_unknown_is_not_found() {
    let server = stub_cloud().await;

    let output = run_against(&server, &["devices", "get", "Garage"]).await;

    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_clean_start_sends_command() {
    let server = stub_cloud().await;
    Mock::given(method("POST"))
        .and(path("/robot/ctl"))
        .and(body_partial_json(json!({ "nickName": "Hall", "cmd": "Clean", "act": "s" })))
        .respond_with(ctl_ok(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["-o", "plain", "clean", "start", "Hall"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "start");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_command_exits_with_code_9() {
    let server = stub_cloud().await;
    Mock::given(method("POST"))
        .and(path("/robot/ctl"))
        .and(body_partial_json(json!({ "cmd": "Charge", "act": "go" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "ALREADY_DOCKED", "msg": "robot is already docked", "data": null
        })))
        .mount(&server)
        .await;

    let output = run_against(&server, &["dock", "return", "Hall"]).await;

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("ALREADY_DOCKED"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = stub_cloud().await;

    let output = run_against(&server, &["-o", "plain", "watch", "--interval", "1", "--count", "1"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Hall"));
}
