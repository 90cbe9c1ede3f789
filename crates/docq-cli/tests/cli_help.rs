use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_options_and_subcommands() {
    cargo_bin_cmd!("docq")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--no-rag"))
        .stdout(predicate::str::contains("--timeout-secs"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("docq")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_health_help() {
    cargo_bin_cmd!("docq")
        .args(["health", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("health"));
}
