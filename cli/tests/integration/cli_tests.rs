//! Integration tests for the provisio CLI surface
//!
//! These tests verify argument parsing, discovery commands and dry runs.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn provisio() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("provisio"));
    cmd.env("NO_COLOR", "1").env_remove("PROVISIO_CONFIG");
    cmd
}

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("provisio.yaml");
    std::fs::write(&path, body).expect("write provisioning file");
    path
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    provisio().assert().code(2).stderr(predicate::str::contains(
        "Provision freshly built machine images",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    provisio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("plugins"))
        .stdout(predicate::str::contains("describe"));
}

#[test]
fn test_version_command_shows_version() {
    provisio()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "provisio {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_no_color_env_accepts_any_non_empty_value() {
    for value in ["1", "true", "yes"] {
        provisio()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("provisio"));
    }
}

#[test]
fn test_no_color_env_empty_does_not_break_parsing() {
    provisio()
        .env("NO_COLOR", "")
        .args(["plugins"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shell-provisioner"));
}

#[test]
fn test_no_color_flag_and_env_together() {
    provisio()
        .args(["--no-color", "version"])
        .assert()
        .success();
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = provisio()
        .args(["version", "--json"])
        .output()
        .expect("run provisio");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_subcommand_fails() {
    provisio()
        .arg("teleport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Discovery ---

#[test]
fn test_plugins_lists_registered_provisioners() {
    provisio()
        .arg("plugins")
        .assert()
        .success()
        .stdout(predicate::str::contains("react-provisioner"))
        .stdout(predicate::str::contains("kong-api-gateway-provisioner"))
        .stdout(predicate::str::contains("shell-provisioner"));
}

#[test]
fn test_plugins_json_is_array_of_names() {
    let output = provisio()
        .args(["plugins", "--json"])
        .output()
        .expect("run provisio");
    let names: Vec<String> = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(names.len(), 7);
    assert!(names.iter().any(|n| n == "docker-mailserver-provisioner"));
}

#[test]
fn test_describe_shows_fields() {
    provisio()
        .args(["describe", "react-provisioner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distSource"))
        .stdout(predicate::str::contains("required"));
}

#[test]
fn test_describe_unknown_plugin_fails() {
    provisio()
        .args(["describe", "nope-provisioner"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown provisioner 'nope-provisioner'"))
        .stderr(predicate::str::contains("Registered provisioners:"));
}

// --- Provision: configuration handling ---

#[test]
fn test_provision_dry_run_prints_plan() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "provisioner: shell-provisioner\nconfig:\n  commands:\n    - echo one\n    - echo two\n",
    );

    provisio()
        .args(["provision", "--dry-run", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan for shell-provisioner"))
        .stdout(predicate::str::contains("echo one"))
        .stdout(predicate::str::contains("echo two"));
}

#[test]
fn test_provision_dry_run_json() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "provisioner: file-provisioner\nconfig:\n  source: ./dist/app.tar\n  destination: /opt/\n",
    );

    let output = provisio()
        .args(["provision", "--dry-run", "--json", "-f"])
        .arg(&path)
        .output()
        .expect("run provisio");
    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(plan["service"], "file-provisioner");
    assert_eq!(plan["flows"][0]["transfers"][0]["destination"], "/opt/");
    assert_eq!(plan["flows"][0]["transfers"][0]["source"]["path"], "./dist/app.tar");
}

#[test]
fn test_provision_set_overrides_file_value() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "provisioner: file-provisioner\nconfig:\n  source: a.txt\n  destination: /srv/\n",
    );

    provisio()
        .args(["provision", "--dry-run", "--set", "destination=/opt/app/", "-f"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/app/"));
}

#[test]
fn test_provision_missing_required_field_fails() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "provisioner: file-provisioner\nconfig:\n  source: a.txt\n");

    provisio()
        .args(["provision", "--dry-run", "-f"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("destination"));
}

#[test]
fn test_provision_unknown_plugin_fails() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "provisioner: ghost-provisioner\n");

    provisio()
        .args(["provision", "-f"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown provisioner 'ghost-provisioner'"));
}

#[test]
fn test_provision_missing_file_fails() {
    provisio()
        .args(["provision", "-f", "/nonexistent/provisio.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read /nonexistent/provisio.yaml"));
}

#[test]
fn test_provision_bad_set_syntax_is_usage_error() {
    provisio()
        .args(["provision", "--set", "novalue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
#[serial]
fn test_provision_reads_file_from_env() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "provisioner: shell-provisioner\nconfig:\n  commands: [\"uname -a\"]\n",
    );

    provisio()
        .env("PROVISIO_CONFIG", &path)
        .args(["provision", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("uname -a"));
}
