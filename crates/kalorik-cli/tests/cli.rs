use assert_cmd::Command;
use predicates::prelude::*;

const STORE_VARS: &[&str] = &[
    "GITHUB_TOKEN",
    "GITHUB_OWNER",
    "GITHUB_REPO",
    "GITHUB_BRANCH",
    "GITHUB_BASE_PATH",
    "GITHUB_API_URL",
    "KALORIK_CONFIG",
    "KALORIK_PASSPHRASE",
    "KALORIK_REVIEW_PASSPHRASE",
];

fn kalorik() -> Command {
    let mut cmd = Command::cargo_bin("kalorik").unwrap();
    for var in STORE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    kalorik()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("save"))
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("stations"));
}

#[test]
fn test_stations_prints_catalog() {
    kalorik()
        .arg("stations")
        .assert()
        .success()
        .stdout(predicate::str::contains("A – Wärmeleitung"))
        .stdout(predicate::str::contains("E – Vergleich Thermos vs. Becher"))
        .stdout(predicate::str::contains("Zeit [min]"));
}

#[test]
fn test_reviewer_command_denied_without_configured_passphrase() {
    kalorik()
        .args(["list", "--passphrase", "geheim"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("access denied"));
}

#[test]
fn test_reviewer_command_denied_on_wrong_passphrase() {
    kalorik()
        .env("KALORIK_REVIEW_PASSPHRASE", "geheim")
        .args(["summary", "--passphrase", "falsch"])
        .assert()
        .code(4);
}

#[test]
fn test_save_without_repository_is_config_error() {
    kalorik()
        .args(["save", "-g", "Gruppe 1", "-s", "A", "--text", "warm"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("repository owner is not set"));
}

#[test]
fn test_unknown_config_field_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kalorik.yaml");
    std::fs::write(&path, "github:\n  ownr: schule\n").unwrap();

    kalorik()
        .arg("--config")
        .arg(&path)
        .args(["load", "-g", "g", "-s", "A"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn test_missing_table_file() {
    kalorik()
        .args(["save", "-g", "g", "-s", "A", "--table", "/nonexistent/a.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/a.csv"));
}
