//! Integration tests for the `streelet` CLI binary.
//!
//! Argument parsing, help output, completions and error exit codes run
//! without a dashboard; the rest talk to a wiremock stand-in.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `streelet` binary with env isolation.
///
/// Clears all `STREELET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn streelet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("streelet");
    cmd.env("HOME", "/tmp/streelet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/streelet-cli-test-nonexistent")
        .env_remove("STREELET_PROFILE")
        .env_remove("STREELET_SERVER")
        .env_remove("STREELET_OUTPUT")
        .env_remove("STREELET_INSECURE")
        .env_remove("STREELET_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn dashboard_with_devices(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// Base URL of a local port with nothing listening on it.
fn closed_port_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = streelet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    streelet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Streelet IoT devices")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("provision"))
            .and(predicate::str::contains("wifi")),
    );
}

#[test]
fn test_version_flag() {
    streelet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("streelet"));
}

#[test]
fn test_devices_help_lists_subcommands() {
    streelet_cmd().args(["devices", "--help"]).assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("power"))
            .and(predicate::str::contains("delete"))
            .and(predicate::str::contains("add")),
    );
}

#[test]
fn test_completions_bash() {
    streelet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("streelet"));
}

#[test]
fn test_config_path_needs_no_dashboard() {
    streelet_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = streelet_cmd()
        .args(["devices", "list", "-o", "xml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_add_requires_topic() {
    let output = streelet_cmd()
        .args(["devices", "add", "--id", "7"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--topic"));
}

#[test]
fn test_no_dashboard_configured() {
    let output = streelet_cmd().args(["devices", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("No dashboard configured"), "{text}");
}

#[test]
fn test_unknown_profile() {
    let output = streelet_cmd()
        .args(["--profile", "lab", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("'lab'"));
}

#[test]
fn test_delete_without_tty_requires_yes() {
    let output = streelet_cmd()
        .args(["--server", "http://127.0.0.1:9", "devices", "delete", "3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Against a dashboard ─────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_json() {
    let server = dashboard_with_devices(json!([
        { "id": 1, "name": "Lamp", "status": "online", "topic": "home/lamp" },
        { "id": 2, "status": "offline" }
    ]))
    .await;

    let output = streelet_cmd()
        .args(["--server", &server.uri(), "devices", "list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let devices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["id"], "1");
    assert_eq!(devices[0]["device_status"], 1);
    assert_eq!(devices[0]["topic"], "home/lamp");
    assert_eq!(devices[1]["name"], "2");
    assert_eq!(devices[1]["device_status"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_plain() {
    let server = dashboard_with_devices(json!([
        { "id": "a1", "status": "online" },
        { "id": "b2", "status": "offline" }
    ]))
    .await;

    streelet_cmd()
        .args(["--server", &server.uri(), "devices", "ls", "-o", "plain"])
        .assert()
        .success()
        .stdout("a1\nb2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_power_toggles_online_device_off() {
    let server = dashboard_with_devices(json!([{ "id": 1, "status": "online" }])).await;
    Mock::given(method("POST"))
        .and(path("/devices/1/power/off"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Device 1 turned off" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    streelet_cmd()
        .args(["--server", &server.uri(), "devices", "power", "1", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device 1 turned off"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes_deletes_device() {
    let server = dashboard_with_devices(json!([{ "id": 3, "status": "online" }])).await;
    Mock::given(method("POST"))
        .and(path("/devices/3/delete"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Device 3 deleted" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    streelet_cmd()
        .args(["--server", &server.uri(), "--yes", "devices", "delete", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device 3 deleted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_power_unknown_device_is_not_found() {
    let server = dashboard_with_devices(json!([{ "id": 1, "status": "online" }])).await;

    let output = streelet_cmd()
        .args(["--server", &server.uri(), "devices", "power", "42"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_failure_shows_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "database unavailable" })),
        )
        .mount(&server)
        .await;

    let output = streelet_cmd()
        .args(["--server", &server.uri(), "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("database unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_dashboard_is_connection_error() {
    let uri = closed_port_uri();

    let output = streelet_cmd()
        .args(["--server", &uri, "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provision_then_lists_devices() {
    let server = dashboard_with_devices(json!([{ "id": 5, "name": "n1", "status": "online" }])).await;
    Mock::given(method("POST"))
        .and(path("/configure"))
        .and(body_json(json!({ "grupo": "g1", "name": "n1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let output = streelet_cmd()
        .args([
            "--server",
            &server.uri(),
            "provision",
            "--group",
            "g1",
            "--name",
            "n1",
            "--redirect-delay",
            "0",
            "-o",
            "plain",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ok"));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_provision_rejection_exits_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/configure"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "message": "Datos incompletos para configurar el ESP" })),
        )
        .mount(&server)
        .await;

    let output = streelet_cmd()
        .args([
            "--server",
            &server.uri(),
            "provision",
            "--group",
            "g1",
            "--name",
            "n1",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Datos incompletos"));
}
