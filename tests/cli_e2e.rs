//! End-to-end CLI tests for the profile-finder binary.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with an isolated config directory.
fn profile_finder(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("profile-finder").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Find social media profiles"))
        .stdout(predicate::str::contains("username"))
        .stdout(predicate::str::contains("instagram"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("profile-finder"));
}

#[test]
fn test_binary_rejects_zero_concurrency() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .args(["-c", "0", "username", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_rejects_unknown_format() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .args(["--format", "xml", "username", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_username_subcommand_requires_names() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .arg("username")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_menu_exit_option_ends_cleanly() {
    let config = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    profile_finder(&config)
        .args(["-o"])
        .arg(output.path())
        .write_stdin("5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Search by email"))
        .stdout(predicate::str::contains("5. Exit"));

    // Nothing was found, so nothing is flushed.
    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_menu_end_of_input_exits() {
    let config = TempDir::new().unwrap();
    profile_finder(&config).write_stdin("").assert().success();
}

#[test]
fn test_menu_rejects_invalid_choice_and_switches_format() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .write_stdin("9\n3\ncsv\n5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[!] Invalid choice."))
        .stdout(predicate::str::contains("Output format set to csv"))
        .stdout(predicate::str::contains("current: csv"));
}

#[test]
fn test_menu_instagram_with_missing_session_file_is_soft_error() {
    let config = TempDir::new().unwrap();
    profile_finder(&config)
        .write_stdin("4\n/nonexistent/cookies.txt\ntarget_user\n5\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Could not get Instagram data"));
}

#[test]
fn test_invalid_config_file_fails_startup() {
    let config = TempDir::new().unwrap();
    let dir = config.path().join("profile-finder");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "concurrency = 0\n").unwrap();

    profile_finder(&config)
        .args(["username", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency"));
}
