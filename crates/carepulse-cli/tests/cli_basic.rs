//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "carepulse-cli", "--"])
        .args(args)
        .env("CAREPULSE_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_reminder_add_and_list() {
    let (stdout, _, code) = run_cli(&[
        "reminder",
        "add",
        "CLI Test Meds",
        "--category",
        "medication",
        "--time",
        "08:00",
        "--days",
        "1,2,3,4,5",
        "--priority",
        "high",
    ]);
    assert_eq!(code, 0, "reminder add failed");
    assert!(stdout.contains("Reminder created:"));

    let (stdout, _, code) = run_cli(&["reminder", "list", "--json"]);
    assert_eq!(code, 0, "reminder list failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("list is JSON");
    assert!(parsed
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["title"] == "CLI Test Meds"));
}

#[test]
fn test_reminder_status_reports_snooze_state() {
    let (stdout, _, code) = run_cli(&["reminder", "add", "CLI Status Check", "--time", "09:30"]);
    assert_eq!(code, 0, "reminder add failed");
    let id = stdout.trim().rsplit(' ').next().unwrap().to_string();

    let (stdout, _, code) = run_cli(&["reminder", "status", &id, "--json"]);
    assert_eq!(code, 0, "reminder status failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    let entry = &parsed.as_array().unwrap()[0];
    assert_eq!(entry["id"], id.as_str());
    assert_eq!(entry["active"], true);
    assert_eq!(entry["snoozed"], false);
    assert_eq!(entry["snoozeCount"], 0);
    assert!(entry["rearmAt"].is_null());
}

#[test]
fn test_reminder_status_unknown_id_fails() {
    let (_, stderr, code) = run_cli(&["reminder", "status", "no-such-id"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown reminder id"));
}

#[test]
fn test_engine_status() {
    let (stdout, _, code) = run_cli(&["engine", "status"]);
    assert_eq!(code, 0, "engine status failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    assert_eq!(parsed["type"], "StateSnapshot");
}

#[test]
fn test_engine_tick_outputs_events_array() {
    let (stdout, _, code) = run_cli(&["engine", "tick"]);
    assert_eq!(code, 0, "engine tick failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("tick is JSON");
    assert!(parsed.is_array());
}

#[test]
fn test_alert_list() {
    let (_, _, code) = run_cli(&["alert", "list"]);
    assert_eq!(code, 0, "alert list failed");
}

#[test]
fn test_config_get_default() {
    let (stdout, _, code) = run_cli(&["config", "get", "scheduler.snooze_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert!(!stdout.trim().is_empty());
}

#[test]
fn test_config_show_prints_full_config() {
    let (stdout, _, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("show is JSON");
    assert!(parsed["scheduler"]["snooze_minutes"].is_number());
    assert!(parsed["notifications"]["enabled"].is_boolean());
}

#[test]
fn test_unknown_category_fails() {
    let (_, stderr, code) = run_cli(&[
        "reminder",
        "add",
        "Bad",
        "--category",
        "bogus",
        "--time",
        "08:00",
    ]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown category"));
}
