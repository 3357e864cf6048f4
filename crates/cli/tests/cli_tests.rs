use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("scorm-sync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SCORM 2004 tracking data sync server"));
}

#[test]
fn test_cli_serve_help() {
    let mut cmd = Command::cargo_bin("scorm-sync").unwrap();
    cmd.arg("serve").arg("--help").assert().success().stdout(predicate::str::contains("port"));
}

#[test]
fn test_cli_attempt_in_memory() {
    let mut cmd = Command::cargo_bin("scorm-sync").unwrap();
    cmd.env_remove("DATABASE_URL")
        .env_remove("SCORM_SYNC_PLATFORM_URL")
        .args(["attempt", "1", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attempt not found: package 1, user 2"));
}

#[test]
fn test_cli_migrate_requires_database_url() {
    let mut cmd = Command::cargo_bin("scorm-sync").unwrap();
    cmd.env_remove("DATABASE_URL")
        .arg("migrate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_cli_attempt_rejects_non_numeric_ids() {
    let mut cmd = Command::cargo_bin("scorm-sync").unwrap();
    cmd.args(["attempt", "abc", "2"]).assert().failure();
}
