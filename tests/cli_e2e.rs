//! End-to-end CLI tests for the flamingo-bridge binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command bound to `state_dir`, isolated from the caller's environment.
fn bridge_cmd(state_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("flamingo-bridge").unwrap();
    cmd.env_remove("FLAMINGO_STATE_DIR")
        .env_remove("FLAMINGO_BRIDGE_ENDPOINT")
        .env_remove("FLAMINGO_BRIDGE_TOKEN")
        .env_remove("RUST_LOG")
        .arg("--state-dir")
        .arg(state_dir);
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("flamingo-bridge").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drive the Flamingo browser bridge"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("flamingo-bridge").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flamingo-bridge"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("flamingo-bridge").unwrap();
    cmd.args(["--invalid-flag", "state"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_state_on_fresh_dir_writes_defaults() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": false"))
        .stdout(predicate::str::contains("\"mediaCount\": 0"));

    let sync: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("sync.json")).unwrap())
            .unwrap();
    assert_eq!(sync["autoIntercept"], json!(true));
    assert_eq!(sync["endpoint"], json!("http://127.0.0.1:16789/add"));
}

#[test]
fn test_flags_persist_between_runs() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["flags", "--enabled", "true", "--sniff", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": true"));

    bridge_cmd(dir.path())
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"enabled\": true"))
        .stdout(predicate::str::contains("\"sniffMediaEnabled\": false"));
}

#[test]
fn test_config_set_masks_token() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["config", "set", "--token", "hunter2", "--allowlist", "example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("token = <set>"))
        .stdout(predicate::str::contains("allowlist = example.com"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_set_without_options_fails() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["config", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to set"));
}

#[test]
fn test_config_set_ignores_bridge_environment() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .env("FLAMINGO_BRIDGE_ENDPOINT", "http://10.0.0.1:1/add")
        .env("FLAMINGO_BRIDGE_TOKEN", "from-env")
        .args(["config", "set", "--native"])
        .assert()
        .success()
        .stdout(predicate::str::contains("transport = native"))
        .stdout(predicate::str::contains("endpoint = http://127.0.0.1:16789/add"))
        .stdout(predicate::str::contains("token = <unset>"));

    let sync: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("sync.json")).unwrap())
            .unwrap();
    assert_eq!(sync["token"], json!(""));
    assert_eq!(sync["endpoint"], json!("http://127.0.0.1:16789/add"));
}

#[test]
fn test_detect_reports_reason() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["detect", "https://cdn.e.com/v/master.M3U8?sig=1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("media (extension)"));

    bridge_cmd(dir.path())
        .args(["detect", "https://e.com/stream", "--content-type", "Video/MP4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("media (content-type)"));

    bridge_cmd(dir.path())
        .args(["detect", "https://e.com/index.html"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("not media"));
}

#[test]
fn test_send_while_disabled_is_skipped() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["send", "https://e.com/a.zip"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("bridge_disabled"));

    bridge_cmd(dir.path())
        .arg("state")
        .assert()
        .success()
        .stdout(predicate::str::contains("bridge_disabled (https://e.com/a.zip)"));
}

#[test]
fn test_intercept_while_disabled_is_skipped() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["intercept", "https://e.com/a.zip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped: bridge disabled"));
}

#[test]
fn test_candidates_list_and_clear_on_empty_catalog() {
    let dir = TempDir::new().unwrap();
    bridge_cmd(dir.path())
        .args(["candidates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
    bridge_cmd(dir.path())
        .args(["candidates", "clear"])
        .assert()
        .success();
}

#[tokio::test]
async fn test_send_and_ping_against_http_bridge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/add"))
        .and(header("X-Token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "task_id": "g-9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let state_dir = dir.path().to_path_buf();
    let endpoint = format!("{}/add", server.uri());
    tokio::task::spawn_blocking(move || {
        bridge_cmd(&state_dir)
            .args(["config", "set", "--http", "--token", "tok", "--endpoint", endpoint.as_str()])
            .assert()
            .success();
        bridge_cmd(&state_dir)
            .args(["flags", "--enabled", "true"])
            .assert()
            .success();
        bridge_cmd(&state_dir)
            .args(["send", "https://e.com/a.zip"])
            .assert()
            .success()
            .stdout(predicate::str::contains("g-9"));
        bridge_cmd(&state_dir).arg("ping").assert().success();
    })
    .await
    .unwrap();
}
