//! Integration tests for the bigio CLI

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn record_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

fn bigio() -> Command {
    Command::cargo_bin("bigio").unwrap()
}

#[test]
fn test_help_command() {
    bigio()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("sort"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn test_invalid_command() {
    bigio()
        .arg("invalid")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_info_json() {
    let file = record_file(&[0u8; 5000]);
    bigio()
        .args(["--format", "json", "info"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""size":5000"#))
        .stdout(predicate::str::contains(r#""strategy":"small""#))
        .stdout(predicate::str::contains(r#""byte_order":"big""#));
}

#[test]
fn test_info_segmented() {
    let file = record_file(&[0u8; 5000]);
    bigio()
        .args(["-o", "json", "info", "--segment-shift", "10"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""strategy":"composite""#))
        .stdout(predicate::str::contains(r#""segments":5"#))
        .stdout(predicate::str::contains(r#""segment_size":1024"#));
}

#[test]
fn test_get_value() {
    let file = record_file(&[0x01, 0x02, 0x03, 0x04]);
    bigio()
        .args(["get", "--pos", "0", "--width", "4"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0x01020304"));
    bigio()
        .args(["get", "-p", "1", "-w", "2", "--byte-order", "little"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("0x0302"));
}

#[test]
fn test_get_out_of_range() {
    let file = record_file(&[0x01, 0x02]);
    bigio()
        .args(["get", "--pos", "1", "--width", "2"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_sort_then_verify() {
    let file = record_file(&[5, 0, 3, 1, 9, 2, 1, 3, 3, 0, 7, 4]);
    bigio()
        .args(["verify", "-r", "2"])
        .arg(file.path())
        .assert()
        .failure();
    bigio()
        .args(["sort", "-r", "2", "--segment-shift", "2"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Sorted 6 records"));
    assert_eq!(
        std::fs::read(file.path()).unwrap(),
        vec![1, 3, 3, 0, 3, 1, 5, 0, 7, 4, 9, 2]
    );
    bigio()
        .args(["-o", "json", "verify", "-r", "2"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""sorted":true"#));
}

#[test]
fn test_sort_by_signed_key() {
    // Little-endian i16 key in the second half of each 4-byte record
    let file = record_file(&[0xaa, 0xaa, 0x05, 0x00, 0xbb, 0xbb, 0xff, 0xff, 0xcc, 0xcc, 0x01, 0x00]);
    bigio()
        .args([
            "sort",
            "-r",
            "4",
            "--key-offset",
            "2",
            "--key-width",
            "2",
            "--signed",
            "--byte-order",
            "little",
        ])
        .arg(file.path())
        .assert()
        .success();
    assert_eq!(
        std::fs::read(file.path()).unwrap(),
        vec![0xbb, 0xbb, 0xff, 0xff, 0xcc, 0xcc, 0x01, 0x00, 0xaa, 0xaa, 0x05, 0x00]
    );
}

#[test]
fn test_sort_partial_area() {
    let file = record_file(&[9, 9, 4, 3, 2, 1, 0]);
    bigio()
        .args(["sort", "-r", "1", "--start", "2", "--length", "4"])
        .arg(file.path())
        .assert()
        .success();
    assert_eq!(std::fs::read(file.path()).unwrap(), vec![9, 9, 1, 2, 3, 4, 0]);
}

#[test]
fn test_sort_unaligned_fails() {
    let file = record_file(&[3, 2, 1, 0, 7]);
    bigio()
        .args(["sort", "-r", "2"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to sort"));
    assert_eq!(std::fs::read(file.path()).unwrap(), vec![3, 2, 1, 0, 7]);
}

#[test]
fn test_key_must_fit_record() {
    let file = record_file(&[0u8; 8]);
    bigio()
        .args(["sort", "-r", "4", "--key-offset", "2", "--key-width", "4"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not fit"));
}

#[test]
fn test_log_level_after_subcommand() {
    let file = record_file(&[2, 1, 0]);
    bigio()
        .env_remove("RUST_LOG")
        .args(["sort", "-r", "1", "--log-level", "info"])
        .arg(file.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Sorted 3 records of 1 bytes"));
    assert_eq!(std::fs::read(file.path()).unwrap(), vec![0, 1, 2]);
}
