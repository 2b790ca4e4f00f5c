//! End-to-end integration tests for the analyze and key flows.
//!
//! Runs the real binary in offline mode against temp log files, so no
//! network access is needed anywhere.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn dlog_binary() -> String {
    env!("CARGO_BIN_EXE_dlog").to_string()
}

/// Runs dlog with HOME and XDG dirs pinned to the temp dir, so no real
/// user config or credentials leak into the test.
fn run_dlog(home: &Path, args: &[&str]) -> Output {
    Command::new(dlog_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .args(args)
        .output()
        .expect("failed to run dlog")
}

fn write_log(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("day.log");
    std::fs::write(&path, content).unwrap();
    path
}

const SAMPLE: &str = "- 09:00 ~ 10:00 閱讀 ❚❚❚\n- 10:00 ~ 11:30 開會 ❚❚\n";

#[test]
fn offline_analyze_prints_dashboard() {
    let temp = TempDir::new().unwrap();
    let log = write_log(temp.path(), SAMPLE);

    let output = run_dlog(temp.path(), &["analyze", log.to_str().unwrap(), "--offline"]);
    assert!(
        output.status.success(),
        "analyze should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DAY REPORT"));
    assert!(stdout.contains("Total logged: 11h 30m"));
    assert!(stdout.contains("Classification: local fallback"));
    assert!(stdout.contains("development"));
    assert!(stdout.contains("work"));
    assert!(stdout.contains("resting"));
}

#[test]
fn offline_analyze_json_output() {
    let temp = TempDir::new().unwrap();
    let log = write_log(temp.path(), SAMPLE);

    let output = run_dlog(
        temp.path(),
        &["analyze", log.to_str().unwrap(), "--offline", "--json"],
    );
    assert!(output.status.success());

    let document: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");

    assert_eq!(document["classification"], "local fallback");
    assert_eq!(document["total_minutes"], 690);
    assert_eq!(document["productivity_score"], 0);

    // Sleep gap-fill plus the two user entries
    let entries = document["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["id"], 0);
    assert_eq!(entries[0]["start"], "00:00");
    assert_eq!(entries[0]["category"], "resting");

    let categories = document["categories"].as_array().unwrap();
    let work = categories
        .iter()
        .find(|row| row["category"] == "work")
        .unwrap();
    assert_eq!(work["minutes"], 90);

    // 2 - 3 = -1 is below the default threshold
    assert!(document["energy_transitions"].as_array().unwrap().is_empty());
    assert!(document.get("advice").is_none());
}

#[test]
fn analyze_reports_thoughts_and_actions() {
    let temp = TempDir::new().unwrap();
    let log = write_log(
        temp.path(),
        "- 09:00 ~ 10:00 閱讀 ❚❚❚\n- > 今天狀態很好\n- v 買維他命\n",
    );

    let output = run_dlog(temp.path(), &["analyze", log.to_str().unwrap(), "--offline"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("THOUGHTS"));
    assert!(stdout.contains("今天狀態很好"));
    assert!(stdout.contains("ACTIONS"));
    assert!(stdout.contains("買維他命"));
}

#[test]
fn analyze_fails_cleanly_without_entries() {
    let temp = TempDir::new().unwrap();
    let log = write_log(temp.path(), "- > 只有想法\n- v 只有行動\n");

    let output = run_dlog(temp.path(), &["analyze", log.to_str().unwrap(), "--offline"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no valid entries"),
        "stderr should explain the empty parse: {stderr}"
    );
}

#[test]
fn analyze_fails_cleanly_on_missing_file() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.log");

    let output = run_dlog(temp.path(), &["analyze", missing.to_str().unwrap(), "--offline"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}

#[test]
fn key_set_show_clear_roundtrip() {
    let temp = TempDir::new().unwrap();

    let output = run_dlog(temp.path(), &["key", "set", "sk-ant-api03-test-key"]);
    assert!(
        output.status.success(),
        "key set should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("API key saved"));

    let output = run_dlog(temp.path(), &["key", "show"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sk-ant-a..."));
    assert!(!stdout.contains("test-key"), "full key must stay masked");

    let output = run_dlog(temp.path(), &["key", "clear"]);
    assert!(output.status.success());

    let output = run_dlog(temp.path(), &["key", "show"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No API key stored."));
}
