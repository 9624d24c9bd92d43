use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::tempdir;

fn dq(root: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("dq").unwrap();
    // Point at a scratch root and an absent config so host config never leaks in.
    cmd.env("DQ_ROOT", root)
        .env("DQ_CONFIG", root.join("config.toml"))
        .arg("--quiet");
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("dq").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("dq").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_suggest_robot_response_shape() {
    let dir = tempdir().unwrap();
    let output = dq(dir.path())
        .args([
            "--robot",
            "suggest",
            "--agency-id",
            "1",
            "--agency-name",
            "Metro Transit",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], Value::Bool(true));
    assert!(!json["query"].as_str().unwrap().is_empty());
    assert_eq!(json["metadata"]["context_key"], "agency:1");
    assert!(json["metadata"]["ucb_score"].is_f64() || json["metadata"]["ucb_score"].is_number());
    let level = json["metadata"]["exploration_level"].as_str().unwrap();
    assert!(["high", "medium", "low"].contains(&level));
    assert!(json["top_alternatives"].as_array().unwrap().len() <= 3);
}

#[test]
fn test_suggest_failure_is_a_response_not_a_crash() {
    let dir = tempdir().unwrap();

    // Exhaust the only word every context-free template shares.
    dq(dir.path())
        .args(["--robot", "state", "exhaust", "global", "transit"])
        .assert()
        .success();

    let output = dq(dir.path()).args(["--robot", "suggest"]).output().unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], Value::Bool(false));
    assert!(json["error"].as_str().unwrap().contains("no usable query candidates"));
}

#[test]
fn test_exhausted_topic_never_surfaces() {
    let dir = tempdir().unwrap();

    dq(dir.path())
        .args(["--robot", "state", "exhaust", "agency:9", "bus"])
        .assert()
        .success();

    let output = dq(dir.path())
        .args([
            "--robot",
            "suggest",
            "--agency-id",
            "9",
            "--agency-name",
            "Metro Transit",
        ])
        .output()
        .unwrap();
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], Value::Bool(true));
    assert!(!json["query"].as_str().unwrap().to_lowercase().contains("bus"));
    for alt in json["top_alternatives"].as_array().unwrap() {
        assert!(!alt["query"].as_str().unwrap().to_lowercase().contains("bus"));
    }
}

#[test]
fn test_history_lists_logged_decision() {
    let dir = tempdir().unwrap();

    let output = dq(dir.path())
        .args([
            "--robot",
            "suggest",
            "--agency-id",
            "3",
            "--agency-name",
            "Metro Transit",
        ])
        .output()
        .unwrap();
    let suggested: Value = serde_json::from_slice(&output.stdout).unwrap();
    let query = suggested["query"].as_str().unwrap().to_string();

    let output = dq(dir.path())
        .args(["--robot", "history", "agency:3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let executions = json["executions"].as_array().unwrap();
    assert_eq!(executions.len(), 1);
    assert_eq!(executions[0]["query_text"], Value::String(query));
}

#[test]
fn test_state_show_after_curation() {
    let dir = tempdir().unwrap();

    dq(dir.path())
        .args([
            "--robot",
            "state",
            "pattern",
            "agency:5",
            "[agency] zero-emission fleet plan",
        ])
        .assert()
        .success();
    dq(dir.path())
        .args(["--robot", "state", "term", "agency:5", "electrification", "25"])
        .assert()
        .success();

    let output = dq(dir.path())
        .args(["--robot", "state", "show", "agency:5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["context_key"], "agency:5");
    assert_eq!(json["proven_patterns"].as_array().unwrap().len(), 1);
    assert_eq!(json["effective_terms"]["electrification"], 25.0);
}

#[test]
fn test_state_show_unknown_context_fails() {
    let dir = tempdir().unwrap();
    dq(dir.path())
        .args(["--robot", "state", "show", "agency:404"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("state_not_found"));
}
