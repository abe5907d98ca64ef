//! End-to-end tests for the flamingo-native-host binary over real pipes.

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;

fn frame(value: &Value) -> Vec<u8> {
    let body = serde_json::to_vec(value).unwrap();
    let mut out = u32::try_from(body.len()).unwrap().to_le_bytes().to_vec();
    out.extend(body);
    out
}

fn unframe(mut bytes: &[u8]) -> Vec<Value> {
    let mut values = Vec::new();
    while bytes.len() >= 4 {
        let len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        values.push(serde_json::from_slice(&bytes[4..4 + len]).unwrap());
        bytes = &bytes[4 + len..];
    }
    values
}

/// Host isolated from the caller's config file and environment.
fn host_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flamingo-native-host").unwrap();
    cmd.env_remove("FLAMINGO_BRIDGE_ENDPOINT")
        .env_remove("FLAMINGO_BRIDGE_TOKEN")
        .env("HOME", config_home.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .arg("chrome-extension://test/");
    cmd
}

#[test]
fn test_host_answers_ping_and_exits_on_eof() {
    let home = TempDir::new().unwrap();
    let mut input = frame(&json!({"action": "ping"}));
    input.extend(frame(&json!({"url": "https://e.com/a.zip"})));

    let output = host_cmd(&home).write_stdin(input).output().unwrap();
    assert!(output.status.success());

    let replies = unframe(&output.stdout);
    assert_eq!(
        replies,
        vec![
            json!({"ok": true, "host": "com.lc5900.flamingo.bridge"}),
            json!({"ok": false, "error": "bridge token missing in native-host config"}),
        ]
    );
}

#[test]
fn test_host_replies_to_bad_frame() {
    let home = TempDir::new().unwrap();
    let mut input = frame(&json!("just a string"));
    input.extend(frame(&json!({"action": "PING"})));

    let output = host_cmd(&home).write_stdin(input).output().unwrap();
    assert!(output.status.success());
    let replies = unframe(&output.stdout);
    assert_eq!(replies[0]["ok"], json!(false));
    assert_eq!(replies[1]["ok"], json!(true));
}

#[test]
fn test_host_reads_token_from_env() {
    let home = TempDir::new().unwrap();
    let input = frame(&json!({"url": ""}));
    let output = host_cmd(&home)
        .env("FLAMINGO_BRIDGE_TOKEN", "t")
        .write_stdin(input)
        .output()
        .unwrap();
    assert_eq!(
        unframe(&output.stdout),
        vec![json!({"ok": false, "error": "url is required"})]
    );
}
