//! Multi-process tests for the vitals binary.
//!
//! These tests verify that separate processes can safely:
//! - Persist records one after another without losing earlier ones
//! - Read the database while another process rewrites it

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
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

fn read_db(data_dir: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(data_dir.join("users.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_sequential_processes_keep_all_records() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli(&data_dir)
        .args(["register", "--user", "olga", "--password", "secret1"])
        .assert()
        .success();

    for day in 1..=5u64 {
        thread::sleep(Duration::from_millis(day * 5));
        cli(&data_dir)
            .args(["log", "--user", "olga", "--password", "secret1"])
            .args(["--date", &format!("2024-07-0{}", day)])
            .args(["--sleep", "7", "--water", "8", "--mood", "3"])
            .assert()
            .success();
    }

    let db = read_db(&data_dir);
    let health_data = db["olga"]["health_data"].as_object().unwrap();
    assert_eq!(
        health_data.len(),
        5,
        "Expected 5 records, got {}",
        health_data.len()
    );
}

#[test]
fn test_concurrent_reads_during_writes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli(&data_dir)
        .args(["register", "--user", "pete", "--password", "secret1"])
        .assert()
        .success();
    cli(&data_dir)
        .args(["log", "--user", "pete", "--password", "secret1"])
        .args(["--date", "2024-07-01", "--sleep", "7", "--water", "8", "--mood", "3"])
        .assert()
        .success();

    // Readers parse the whole database on open and must never see a partial write.
    // Logging in would stamp last_login, so they stick to anonymous commands.
    let readers: Vec<_> = (0..3)
        .map(|_| {
            let dir: PathBuf = data_dir.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    cli(&dir)
                        .args(["bmi", "--height", "170", "--weight", "70"])
                        .assert()
                        .success();
                }
            })
        })
        .collect();

    for day in 2..=4 {
        cli(&data_dir)
            .args(["log", "--user", "pete", "--password", "secret1"])
            .args(["--date", &format!("2024-07-0{}", day)])
            .args(["--sleep", "8", "--water", "9", "--mood", "4"])
            .assert()
            .success();
    }

    for handle in readers {
        handle.join().expect("Reader thread panicked");
    }

    let db = read_db(&data_dir);
    assert_eq!(db["pete"]["health_data"].as_object().unwrap().len(), 4);
}
