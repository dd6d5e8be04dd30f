use assert_cmd::Command;
use predicates::prelude::*;

fn bridgewatch() -> Command {
    let mut cmd = Command::cargo_bin("bridgewatch").expect("binary built");
    cmd.env_remove("DATABASE_URL");
    cmd
}

fn write_temp_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).expect("write temp config");
    path
}

#[test]
fn help_lists_subcommands() {
    bridgewatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("exchanges"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn exchanges_prints_builtin_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(&dir, "");

    bridgewatch()
        .args(["exchanges", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("bitstamp-eur"))
        .stdout(predicate::str::contains("rU2mEJSLqBRkYLVTv55rFTgQajkLTnT6mA"));
}

#[test]
fn exchanges_json_is_parseable() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(&dir, "");

    let output = bridgewatch()
        .args(["exchanges", "--json", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value.as_array().map(Vec::len), Some(5));
}

#[test]
fn stats_without_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(&dir, "");

    bridgewatch()
        .args(["stats", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("database.path"));
}

#[test]
fn stats_on_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("events.db");
    let path = write_temp_config(
        &dir,
        &format!("[database]\npath = \"{}\"\n", db.display()),
    );

    bridgewatch()
        .args(["stats", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No corridor events recorded yet."));
}

#[test]
fn invalid_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_temp_config(&dir, "[logging]\nformat = \"xml\"\n");

    bridgewatch()
        .args(["exchanges", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("logging.format"));
}
