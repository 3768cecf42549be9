//! Integration tests for the `fleetwatch` CLI binary.
//!
//! Store-only commands run against a file store inside a temp dir; API
//! commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `fleetwatch` binary with env isolation.
///
/// Clears all `FLEETWATCH_*` env vars and points config and data
/// directories into `home` so tests never touch real configuration.
fn fleetwatch_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fleetwatch");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("FLEETWATCH_PROFILE")
        .env_remove("FLEETWATCH_API_KEY")
        .env_remove("FLEETWATCH_BASE_URL")
        .env_remove("FLEETWATCH_OUTPUT")
        .env_remove("FLEETWATCH_TIMEOUT")
        .env_remove("FLEETWATCH_STORE_TOKEN");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn tracking_api() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/unit/list.json"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "units": [
                    { "unit_id": 7, "number": "AB-1234", "vehicle_title": "Volvo FH",
                      "lat": 56.95, "lng": 24.1, "drivers": [{ "name": "Ada" }] },
                    { "unit_id": 8, "label": "Spare van" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let alert = json!({
        "unit_id": 7,
        "datetime": "2024-05-10T11:58:20Z",
        "type_name": "Speeding",
        "msg": "92 km/h in 50 zone"
    });
    Mock::given(method("GET"))
        .and(path("/api/v1/alert/list.json"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "alerts": [alert.clone(), alert] }
        })))
        .mount(&server)
        .await;

    server
}

fn api_args(server: &MockServer) -> Vec<String> {
    vec![
        "--base-url".into(),
        format!("{}/api/v1/", server.uri()),
        "--api-key".into(),
        "test-key".into(),
    ]
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    fleetwatch_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("watch")
            .and(predicate::str::contains("units"))
            .and(predicate::str::contains("alarms"))
            .and(predicate::str::contains("overrides"))
            .and(predicate::str::contains("clients")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    fleetwatch_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetwatch"));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path())
        .args(["--output", "invalid", "units"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("possible values") || text.contains("invalid"), "{text}");
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = tempfile::tempdir().unwrap();
    fleetwatch_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    fleetwatch_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    let home = tempfile::tempdir().unwrap();
    fleetwatch_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml").and(predicate::str::contains("fleetwatch")));
}

#[test]
fn test_config_show_without_file() {
    let home = tempfile::tempdir().unwrap();
    fleetwatch_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_profile\""));
}

#[test]
fn test_unknown_profile_is_not_found() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path())
        .args(["--profile", "nope", "clients", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_units_without_api_key() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path()).arg("units").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No API key"));
}

// ── Clients ─────────────────────────────────────────────────────────

#[test]
fn test_clients_add_list_remove() {
    let home = tempfile::tempdir().unwrap();

    fleetwatch_cmd(home.path())
        .args(["clients", "add", "--company", "Acme Logistics", "--phone", "+371 2000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Logistics"));

    fleetwatch_cmd(home.path())
        .args(["clients", "add", "--company", "Baltic Freight"])
        .assert()
        .success();

    fleetwatch_cmd(home.path())
        .args(["-o", "plain", "clients", "list"])
        .assert()
        .success()
        .stdout("1\n2\n");

    fleetwatch_cmd(home.path())
        .args(["clients", "remove", "1"])
        .assert()
        .success();

    let output = fleetwatch_cmd(home.path())
        .args(["clients", "remove", "1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_client_without_company_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path())
        .args(["clients", "add", "--company", "   "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Overrides ───────────────────────────────────────────────────────

#[test]
fn test_override_set_and_list() {
    let home = tempfile::tempdir().unwrap();

    fleetwatch_cmd(home.path())
        .args(["overrides", "set", "7", "--driver", "  Ada  "])
        .assert()
        .success();
    fleetwatch_cmd(home.path())
        .args(["overrides", "set", "7", "--number", "LV-7"])
        .assert()
        .success();

    let output = fleetwatch_cmd(home.path())
        .args(["-o", "json-compact", "overrides", "list"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        listed,
        json!([{ "unitId": 7, "number": "LV-7", "driver": "Ada", "isMock": false }])
    );
}

#[test]
fn test_override_with_unknown_client_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path())
        .args(["overrides", "set", "7", "--client", "42"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("client 42 does not exist"));
}

#[test]
fn test_empty_override_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path())
        .args(["overrides", "set", "7", "--driver", " "])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Tracking API commands ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_units_are_merged_with_overrides() {
    let server = tracking_api().await;
    let home = tempfile::tempdir().unwrap();

    let output = run({
        let mut cmd = fleetwatch_cmd(home.path());
        cmd.args(["overrides", "set", "8", "--driver", "Bob"]);
        cmd
    })
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let output = run({
        let mut cmd = fleetwatch_cmd(home.path());
        cmd.args(api_args(&server)).args(["-o", "json", "units"]);
        cmd
    })
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let units: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let units = units.as_array().unwrap();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0]["number"], "AB-1234");
    assert_eq!(units[0]["driver"], "Ada");
    assert_eq!(units[1]["number"], "Spare van");
    assert_eq!(units[1]["driver"], "Bob");
    assert_eq!(units[1]["is_mock"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_alarms_are_deduplicated() {
    let server = tracking_api().await;
    let home = tempfile::tempdir().unwrap();

    let output = run({
        let mut cmd = fleetwatch_cmd(home.path());
        cmd.args(api_args(&server))
            .args(["-o", "plain", "alarms", "--since-minutes", "30"]);
        cmd
    })
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout), "7-1715342300\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_api_key_is_an_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/alert/list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": { "code": 10 }
        })))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let output = run({
        let mut cmd = fleetwatch_cmd(home.path());
        cmd.args(api_args(&server)).arg("alarms");
        cmd
    })
    .await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[test]
fn test_unreachable_api_fails_the_units_command() {
    let home = tempfile::tempdir().unwrap();
    let output = fleetwatch_cmd(home.path())
        .args([
            "--base-url",
            "http://127.0.0.1:1/api/v1/",
            "--api-key",
            "k",
            "--timeout",
            "2",
            "units",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Poll failed"));
}
