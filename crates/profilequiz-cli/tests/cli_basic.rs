//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run with the data directory pointed at
//! a temporary directory, so config and stored sessions never touch the real
//! profile.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

const CONTENT: &str = r#"{
  "title": "A or B",
  "personalities": [
    { "name": "A", "description": "First of all" },
    { "name": "B" }
  ],
  "questions": [
    { "text": "Q1", "answers": [ { "text": "a", "personality": "A=1" }, { "text": "b", "personality": "B=1" } ] },
    { "text": "Q2", "answers": [ { "text": "a", "personality": "A=1" }, { "text": "b", "personality": "B=1" } ] }
  ]
}"#;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new("cargo")
        .args(["run", "-q", "-p", "profilequiz-cli", "--"])
        .args(args)
        .env("PROFILEQUIZ_DATA_DIR", home.join("data"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn setup() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let content = dir.path().join("ab.json");
    std::fs::write(&content, CONTENT).unwrap();
    let content = content.to_string_lossy().into_owned();
    (dir, content)
}

#[test]
fn test_score_unique_winner() {
    let (home, content) = setup();
    let (stdout, stderr, code) = run_cli(home.path(), &["score", &content, "--answers", "0:0;1:0"], "");
    assert_eq!(code, 0, "score failed: {stderr}");

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["personality"], "A");
    assert_eq!(report["scores"], serde_json::json!([2.0, 0.0]));
    assert_eq!(report["tie_break_used"], false);
}

#[test]
fn test_score_tie_uses_seed() {
    let (home, content) = setup();
    let args = ["score", content.as_str(), "--answers", "0:0;1:1", "--seed", "9"];
    let (first, _, code) = run_cli(home.path(), &args, "");
    assert_eq!(code, 0);
    let (second, _, _) = run_cli(home.path(), &args, "");

    let report: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert_eq!(report["tie_break_used"], true);
    assert_eq!(report["winners"], serde_json::json!(["A", "B"]));
    assert_eq!(first, second);
}

#[test]
fn test_score_rejects_malformed_answers() {
    let (home, content) = setup();
    let (_, stderr, code) = run_cli(home.path(), &["score", &content, "--answers", "zero"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_missing_content_file_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["score", "does-not-exist.json"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_play_stores_and_exports_result() {
    let (home, content) = setup();

    let (stdout, stderr, code) = run_cli(home.path(), &["play", &content], "1\nn\n1\nn\nq\n");
    assert_eq!(code, 0, "play failed: {stderr}");
    assert!(stdout.contains("(1 of 2)"));
    assert!(stdout.contains("== A =="));
    assert!(stdout.contains("» Here are your results. A. First of all"));

    let (stdout, _, code) = run_cli(home.path(), &["state", "show", "ab"], "");
    assert_eq!(code, 0);
    let state: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(state["results"], "A");
    assert_eq!(state["panelIndex"], 2);

    let out = home.path().join("out");
    let out_arg = out.to_string_lossy().into_owned();
    let (stdout, stderr, code) = run_cli(home.path(), &["export", &content, "--out", &out_arg], "");
    assert_eq!(code, 0, "export failed: {stderr}");
    assert!(stdout.contains("exported:"));
    let document = std::fs::read_to_string(out.join("ProfileConfiguratorResults-ab.md")).unwrap();
    assert!(document.contains("# A"));

    let (stdout, _, _) = run_cli(home.path(), &["state", "clear", "ab"], "");
    assert!(stdout.contains("session cleared: ab"));
}

#[test]
fn test_export_file_name_is_sanitized() {
    let (home, content) = setup();
    let (_, stderr, code) = run_cli(home.path(), &["play", &content, "--id", "my/quiz"], "2\nn\n2\nn\nq\n");
    assert_eq!(code, 0, "play failed: {stderr}");

    let out = home.path().join("out");
    let out_arg = out.to_string_lossy().into_owned();
    let (_, stderr, code) = run_cli(
        home.path(),
        &["export", &content, "--id", "my/quiz", "--out", &out_arg],
        "",
    );
    assert_eq!(code, 0, "export failed: {stderr}");
    let document = std::fs::read_to_string(out.join("ProfileConfiguratorResults-my_quiz.md")).unwrap();
    assert!(document.contains("# B"));
}

#[test]
fn test_play_resumes_stored_session() {
    let (home, content) = setup();
    run_cli(home.path(), &["play", &content], "2\nn\nq\n");

    let (stdout, _, code) = run_cli(home.path(), &["play", &content, "--events"], "q\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("(2 of 2)"));
    assert!(stdout.contains("Q2"));
}

#[test]
fn test_config_set_get() {
    let home = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "visual.appearance", "chat"], "");
    assert_eq!(code, 0);
    assert!(stdout.contains("ok"));

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "visual.appearance"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "chat");

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "visual.nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}
