//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test
//! points the config directory at its own temp dir.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "eventpage-cli", "--"])
        .args(args)
        .env("EVENTPAGE_CONFIG_DIR", config_dir)
        .env_remove("EVENTPAGE_API_URL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_countdown_show_text() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["countdown", "show", "--end", "2025-01-02T00:00:00Z", "--now", "2025-01-01T23:00:00Z"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "00d 01:00:00");
}

#[test]
fn test_countdown_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &[
            "countdown", "show", "--json",
            "--end", "2025-01-03T00:00:30Z",
            "--now", "2025-01-01T00:00:00Z",
        ],
    );
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["breakdown"]["days"], 2);
    assert_eq!(json["breakdown"]["seconds"], 30);
    assert_eq!(json["breakdown"]["ended"], false);
    assert_eq!(json["display"]["seconds"], "30");
}

#[test]
fn test_countdown_show_past_end() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["countdown", "show", "--end", "2020-01-01T00:00:00Z"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ended");
}

#[test]
fn test_countdown_rejects_bad_end() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["countdown", "show", "--end", "whenever"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Invalid end time"), "stderr: {stderr}");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "api.timeout_ms"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "8000");
    assert!(dir.path().join("config.toml").exists());

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "reveal.threshold", "0.3"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "reveal.threshold"]);
    assert_eq!(stdout.trim(), "0.3");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "reveal.threshold", "3"]);
    assert_ne!(code, 0);
    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key: nope"), "stderr: {stderr}");
}

#[test]
fn test_config_rejects_zero_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "api.timeout_ms", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("api.timeout_ms"), "stderr: {stderr}");
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "api.timeout_ms"]);
    assert_eq!(stdout.trim(), "8000");
}

#[test]
fn test_countdown_accepts_minute_precision_offset() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["countdown", "show", "--end", "2025-01-02T09:00+09:00", "--now", "2025-01-01T23:00Z"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "00d 01:00:00");
}

#[test]
fn test_malformed_config_warns_and_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[reveal\nthreshold = ").unwrap();
    let script = dir.path().join("script.json");
    std::fs::write(
        &script,
        r#"{"elements": ["hero"], "steps": [{"action": "intersect", "entries": [{"target": "hero", "ratio": 0.2}]}]}"#,
    )
    .unwrap();

    let (stdout, stderr, code) = run_cli(dir.path(), &["reveal", "replay", script.to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stderr.contains("config unreadable; using defaults"), "stderr: {stderr}");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["events"][0]["threshold"], 0.12);
    assert_eq!(json["revealed"], serde_json::json!(["hero"]));
}

#[test]
fn test_reveal_replay() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("script.json");
    std::fs::write(
        &script,
        r#"{
            "elements": ["hero", "form"],
            "steps": [{"action": "intersect", "entries": [{"target": "form", "ratio": 0.6}]}]
        }"#,
    )
    .unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["reveal", "replay", script.to_str().unwrap()]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["revealed"], serde_json::json!(["form"]));
    assert_eq!(json["events"][0]["type"], "ObserverActivated");
}

#[test]
fn test_submit_requires_consent() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["event", "submit", "--event-id", "1", "--name", "Kim", "--phone", "010"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("agree-privacy"), "stderr: {stderr}");
}
