//! Integration tests for the CLI surface: help, argument parsing, and
//! the `validate` subcommand.

#![allow(clippy::expect_used)]

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{NamedTempFile, TempDir};

pub fn sre_toolkit() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sre-toolkit"));
    for var in [
        "RUST_LOG",
        "AWS_PROFILE",
        "AWS_REGION",
        "SRE_TOOLKIT_DRY_RUN",
        "SRE_TOOLKIT_AWS_CLI",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn worksheet(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write worksheet");
    file
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    sre_toolkit().assert().code(2).stderr(predicate::str::contains(
        "Declarative runbook executor",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    sre_toolkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    sre_toolkit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sre-toolkit"));
}

#[test]
fn test_run_requires_config_path() {
    sre_toolkit().arg("run").assert().code(2);
}

#[test]
fn test_invalid_log_level_rejected() {
    sre_toolkit()
        .args(["--log-level", "loud", "validate", "w.yaml"])
        .assert()
        .code(2);
}

// --- validate ---

#[test]
fn test_validate_lists_planned_steps() {
    let ws = worksheet(
        "region: eu-west-1\noperations:\n  - type: stop_instance\n    instance_id: i-1\n  - type: reboot\n",
    );
    sre_toolkit()
        .arg("validate")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("region=eu-west-1"))
        .stdout(predicate::str::contains("dry_run=true"))
        .stdout(predicate::str::contains("1. stop_instance i-1"))
        .stdout(predicate::str::contains("2. skipped: unknown operation type 'reboot'"));
}

#[test]
fn test_validate_missing_file_exits_one() {
    sre_toolkit()
        .args(["validate", "/nonexistent/worksheet.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_validate_bad_parameters_exits_one() {
    let ws = worksheet("operations:\n  - type: snapshot_volume\n    volume: vol-1\n");
    sre_toolkit()
        .arg("validate")
        .arg(ws.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Operation #1 (snapshot_volume)"));
}

#[test]
fn test_validate_honors_dry_run_env() {
    let ws = worksheet("dry_run: true\n");
    sre_toolkit()
        .env("SRE_TOOLKIT_DRY_RUN", "false")
        .arg("validate")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("dry_run=false"));
}

// --- .env loading ---

fn dotenv_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(
        dir.path().join(".env"),
        "AWS_PROFILE=from-dotenv\nAWS_REGION=eu-north-1\nSRE_TOOLKIT_DRY_RUN=false\n",
    )
    .expect("write .env");
    std::fs::write(dir.path().join("worksheet.yaml"), "operations: []\n")
        .expect("write worksheet");
    dir
}

#[test]
fn test_validate_reads_dotenv_from_working_directory() {
    let dir = dotenv_dir();
    sre_toolkit()
        .current_dir(dir.path())
        .args(["validate", "worksheet.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "profile=from-dotenv region=eu-north-1 dry_run=false",
        ));
}

#[test]
fn test_process_env_wins_over_dotenv() {
    let dir = dotenv_dir();
    sre_toolkit()
        .current_dir(dir.path())
        .env("AWS_REGION", "us-west-2")
        .env("SRE_TOOLKIT_DRY_RUN", "true")
        .args(["validate", "worksheet.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "profile=from-dotenv region=us-west-2 dry_run=true",
        ));
}
