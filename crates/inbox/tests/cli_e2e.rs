#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn inbox_cmd(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("inbox"));
    cmd.env("INBOX_DATA", data.as_os_str())
        .env_remove("INBOX_LOG")
        .current_dir(data);
    cmd
}

fn add(data: &Path, args: &[&str]) {
    inbox_cmd(data)
        .arg("add")
        .args(args)
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry saved"));
}

fn listed(data: &Path) -> Vec<serde_json::Value> {
    let output = inbox_cmd(data)
        .args(["list", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn add_then_list() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["Buy milk", "-n", "2 liters"]);

    inbox_cmd(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Buy milk (+2)"));

    let entries = listed(temp.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["command"], "Buy milk\n+\n2 liters");
    assert!(entries[0]["id"].as_str().unwrap().starts_with("task_"));
}

#[test]
fn naked_run_lists() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved entries"));
}

#[test]
fn add_empty_form_fails() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .arg("add")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Enter a description"));
    assert!(listed(temp.path()).is_empty());
}

#[test]
fn list_is_newest_first() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["first"]);
    std::thread::sleep(std::time::Duration::from_millis(5));
    add(temp.path(), &["second"]);

    let entries = listed(temp.path());
    assert_eq!(entries[0]["command"], "second");
    assert_eq!(entries[1]["command"], "first");
}

#[test]
fn delete_by_id() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["one"]);
    add(temp.path(), &["two"]);
    let id = listed(temp.path())[0]["id"].as_str().unwrap().to_string();

    inbox_cmd(temp.path())
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry deleted"));
    assert_eq!(listed(temp.path()).len(), 1);

    inbox_cmd(temp.path())
        .args(["delete", &id])
        .assert()
        .success()
        .stderr(predicate::str::contains("No entry with id"));
}

#[test]
fn clear_then_restore() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["one"]);
    add(temp.path(), &["two"]);

    inbox_cmd(temp.path())
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 2 entries"));
    assert!(listed(temp.path()).is_empty());

    inbox_cmd(temp.path())
        .arg("backup-info")
        .assert()
        .success()
        .stdout(predicate::str::contains("holds 2 entries"));

    inbox_cmd(temp.path())
        .arg("restore")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 2 entries"));
    assert_eq!(listed(temp.path()).len(), 2);
}

#[test]
fn restore_without_backup_fails() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .arg("restore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: No backup available"));
}

#[test]
fn export_writes_dated_text_file() {
    let temp = TempDir::new().unwrap();
    let out_dir = temp.path().join("exports");
    add(temp.path(), &["first", "-n", "note"]);
    add(temp.path(), &["second"]);

    inbox_cmd(temp.path())
        .args(["export", "--out", out_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 entries"));

    let files: Vec<_> = fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("inbox_") && files[0].ends_with(".txt"));

    let content = fs::read_to_string(out_dir.join(&files[0])).unwrap();
    assert_eq!(content, "first\n+\nnote\n\nsecond\n");
}

#[test]
fn export_with_nothing_saved_fails() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .arg("export")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no saved entries to export"));
}

#[test]
fn snapshot_round_trip_between_data_dirs() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let snapshot = source.path().join("snapshot.json");
    add(source.path(), &["carry", "-m"]);
    add(source.path(), &["over", "-n", "x"]);

    inbox_cmd(source.path())
        .args(["snapshot", "export", "--out", snapshot.to_str().unwrap()])
        .assert()
        .success();

    inbox_cmd(target.path())
        .args(["snapshot", "import", snapshot.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 entries"));

    assert_eq!(listed(source.path()), listed(target.path()));
}

#[test]
fn snapshot_export_to_stdout_has_markers() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["one"]);

    let output = inbox_cmd(temp.path())
        .args(["snapshot", "export"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["version"], "1.0.0");
    assert!(json["timestamp"].is_string());
    assert_eq!(json["savedEntries"].as_array().unwrap().len(), 1);
}

#[test]
fn invalid_snapshot_is_rejected() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["keep"]);
    let bad = temp.path().join("bad.json");
    fs::write(&bad, r#"{"savedEntries": []}"#).unwrap();

    inbox_cmd(temp.path())
        .args(["snapshot", "import", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid import format"));
    assert_eq!(listed(temp.path()).len(), 1);
}

#[test]
fn piped_preview_prints_plain_command() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .args(["preview", "Buy milk", "-n", "2 liters", "-n", "skimmed"])
        .assert()
        .success()
        .stdout("Buy milk\n+\n2 liters\nskimmed\n");
    assert!(listed(temp.path()).is_empty());
}

#[test]
fn piped_preview_of_empty_form_fails() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .arg("preview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least one field is required"));
}

#[test]
fn info_reports_storage() {
    let temp = TempDir::new().unwrap();
    add(temp.path(), &["one"]);
    inbox_cmd(temp.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("available"))
        .stdout(predicate::str::contains("Entries:   1 / 1000"));
}

#[test]
fn compose_session_saves_entry() {
    let temp = TempDir::new().unwrap();
    inbox_cmd(temp.path())
        .arg("compose")
        .write_stdin("desc Call Bob\nnote about the lease\nsave\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Call Bob\n+\nabout the lease"))
        .stdout(predicate::str::contains("1 saved"));

    assert_eq!(listed(temp.path())[0]["command"], "Call Bob\n+\nabout the lease");
}

#[test]
fn config_file_limits_capacity() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("inbox.toml"), "max_entries = 1\n").unwrap();
    add(temp.path(), &["only"]);

    inbox_cmd(temp.path())
        .args(["add", "one too many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("The inbox is full"));
    assert_eq!(listed(temp.path()).len(), 1);
}

#[test]
fn data_flag_overrides_env() {
    let env_dir = TempDir::new().unwrap();
    let flag_dir = TempDir::new().unwrap();

    inbox_cmd(env_dir.path())
        .args(["add", "flagged", "--data", flag_dir.path().to_str().unwrap()])
        .assert()
        .success();

    assert!(listed(env_dir.path()).is_empty());
    assert_eq!(listed(flag_dir.path()).len(), 1);
}
