//! Corruption and recovery tests for the vitals binary.
//!
//! These tests verify that the user database:
//! - Is refused, not overwritten, when it cannot be parsed
//! - Is created on first use
//! - Stays readable when written by older versions

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitals"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env_remove("VITALS_PASSWORD")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupt_database_is_left_untouched() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let db_path = data_dir.join("users.json");

    let garbage = "{\"alice\": {\"password_hash\": \"abc\", \"health_da";
    fs::write(&db_path, garbage).unwrap();

    cli(data_dir)
        .args(["register", "--user", "bob", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));

    assert_eq!(fs::read_to_string(&db_path).unwrap(), garbage);
}

#[test]
fn test_wrong_shape_is_corrupt() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let db_path = data_dir.join("users.json");
    fs::write(&db_path, "[1, 2, 3]").unwrap();

    cli(data_dir)
        .args(["login", "--user", "bob", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corrupt"));

    assert_eq!(fs::read_to_string(&db_path).unwrap(), "[1, 2, 3]");
}

#[test]
fn test_missing_database_is_created() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("fresh");

    cli(&data_dir)
        .args(["login", "--user", "nobody", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    let content = fs::read_to_string(data_dir.join("users.json")).unwrap();
    assert_eq!(content.trim(), "{}");
}

#[test]
fn test_legacy_database_login_upgrades_hash() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let db_path = data_dir.join("users.json");

    // sha256("password123") with empty-string profile fields
    let legacy = r#"{
    "carol": {
        "username": "carol",
        "password_hash": "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f",
        "email": "",
        "profile": {
            "age": "",
            "height": "",
            "weight": "",
            "gender": "female",
            "created_at": "2024-02-01 09:30:00",
            "last_login": ""
        },
        "health_data": {
            "2024-02-02": {
                "sleep": 7.5,
                "water": 6.0,
                "mood": 4,
                "meals": "toast",
                "reflection": "",
                "timestamp": "2024-02-02 21:00:00"
            }
        },
        "bmi_history": []
    }
}"#;
    fs::write(&db_path, legacy).unwrap();

    cli(data_dir)
        .args(["show", "--user", "carol", "--password", "password123", "--date", "2024-02-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Meals: toast"));

    let db: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&db_path).unwrap()).unwrap();
    let hash = db["carol"]["password_hash"].as_str().unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert_eq!(db["carol"]["profile"]["gender"], "female");
    assert_eq!(db["carol"]["health_data"]["2024-02-02"]["meals"], "toast");

    // Upgraded hash still accepts the same password
    cli(data_dir)
        .args(["login", "--user", "carol", "--password", "password123"])
        .assert()
        .success();
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let config_path = data_dir.join("bad.toml");
    fs::write(&config_path, "[reports]\nwindow_days = 0\n").unwrap();

    cli(data_dir)
        .arg("--config")
        .arg(&config_path)
        .args(["bmi", "--height", "170", "--weight", "70"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
