//! Integration tests driving the `shield` binary end to end.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn shield(workspace: &Path, home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shield"))
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("SHIELD_LOG")
        .arg("--workspace")
        .arg(workspace)
        .arg("--quiet")
        .args(args)
        .output()
        .unwrap()
}

fn workspace_with_config(temp_dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let home = temp_dir.path().join("home");
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::create_dir_all(workspace.join("etc")).unwrap();
    fs::write(workspace.join("etc").join("hosts"), "127.0.0.1 localhost\n").unwrap();
    fs::write(
        workspace.join("config").join("config.toml"),
        "paths = [\"etc\"]\npoll_interval_seconds = 1\n",
    )
    .unwrap();
    (workspace, home)
}

#[test]
fn test_baseline_check_show_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let (workspace, home) = workspace_with_config(&temp_dir);

    let output = shield(&workspace, &home, &["baseline"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(workspace.join("checksums.json").exists());

    let output = shield(&workspace, &home, &["check", "--fail-on-alert"]);
    assert!(output.status.success());

    let output = shield(&workspace, &home, &["show", "--format", "json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["checksum"].as_str().unwrap().len(), 64);
}

#[test]
fn test_check_reports_tampering_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let (workspace, home) = workspace_with_config(&temp_dir);
    assert!(shield(&workspace, &home, &["baseline"]).status.success());

    fs::write(workspace.join("etc").join("hosts"), "10.0.0.1 localhost\n").unwrap();

    let output = shield(
        &workspace,
        &home,
        &["check", "--format", "json", "--fail-on-alert"],
    );
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let alerts = value["integrity_alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["type"], "checksum");
}

#[test]
fn test_check_without_baseline_fails() {
    let temp_dir = TempDir::new().unwrap();
    let (workspace, home) = workspace_with_config(&temp_dir);

    let output = shield(&workspace, &home, &["check"]);
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_invalid_config_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let (workspace, home) = workspace_with_config(&temp_dir);
    fs::write(
        workspace.join("config").join("config.toml"),
        "poll_interval_seconds = 0\n",
    )
    .unwrap();

    let output = shield(&workspace, &home, &["baseline"]);
    assert!(!output.status.success());
    assert!(!workspace.join("checksums.json").exists());
}

#[test]
fn test_unknown_output_format_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let (workspace, home) = workspace_with_config(&temp_dir);
    assert!(shield(&workspace, &home, &["baseline"]).status.success());

    let output = shield(&workspace, &home, &["check", "--format", "yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}
