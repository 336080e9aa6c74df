//! CLI integration tests for mgraph
//!
//! These tests run the binary against record files in a temporary directory
//! and check output, exit codes and the files left behind.

use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance for the mgraph binary, isolated from the user's config
fn mgraph_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("mgraph"));
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env_remove("MGRAPH_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const ALICE: &str = r#"{
  "name": "Alice",
  "age": 30,
  "address": { "street": "Main St 1", "city": "Springfield", "postal_code": "12345" },
  "tags": ["admin"]
}"#;

const ALICE_OLDER: &str = r#"{
  "name": "Alice",
  "age": 31,
  "address": { "street": "Main St 1", "city": "Shelbyville", "postal_code": "12345" },
  "tags": ["admin"]
}"#;

// =============================================================================
// Members
// =============================================================================

#[test]
fn test_members_lists_person_table() {
    let dir = TempDir::new().unwrap();

    mgraph_cmd(dir.path())
        .args(["members", "person"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MEMBER"))
        .stdout(predicate::str::contains("address"))
        .stdout(predicate::str::contains("composite"));
}

#[test]
fn test_members_json() {
    let dir = TempDir::new().unwrap();

    let output = mgraph_cmd(dir.path())
        .args(["--format", "json", "members", "company"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "company");
    let names: Vec<&str> = json["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"employees"));
    assert!(names.contains(&"quarterly_revenue"));
}

#[test]
fn test_members_accepts_alias() {
    let dir = TempDir::new().unwrap();

    mgraph_cmd(dir.path())
        .args(["members", "org"])
        .assert()
        .success()
        .stdout(predicate::str::contains("headquarters"));
}

#[test]
fn test_unknown_kind_fails() {
    let dir = TempDir::new().unwrap();

    mgraph_cmd(dir.path())
        .args(["members", "invoice"])
        .assert()
        .failure();
}

// =============================================================================
// Equal
// =============================================================================

#[test]
fn test_equal_same_content_across_formats() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", ALICE);
    let b = write(
        &dir,
        "b.yaml",
        "name: Alice\nage: 30\naddress:\n  street: Main St 1\n  city: Springfield\n  postal_code: '12345'\ntags:\n  - admin\n",
    );

    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("equal"));
}

#[test]
fn test_equal_different_exits_one() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", ALICE);
    let b = write(&dir, "b.json", ALICE_OLDER);

    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("different"));
}

#[test]
fn test_equal_json() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", ALICE);

    let output = mgraph_cmd(dir.path())
        .args(["-f", "json", "equal", "person"])
        .arg(&a)
        .arg(&a)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["equal"], true);
}

#[test]
fn test_equal_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.txt", ALICE);

    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&a)
        .arg(&a)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported record file"));
}

#[test]
fn test_equal_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", ALICE);

    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&a)
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to open record"));
}

#[test]
fn test_equal_error_is_not_confused_with_difference() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.json", ALICE);
    let broken = write(&dir, "broken.json", "{ \"name\": ");

    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&a)
        .arg(&broken)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("different").not());
}

// =============================================================================
// Merge
// =============================================================================

#[test]
fn test_merge_prints_merged_record() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "new.json", ALICE_OLDER);
    let target = write(&dir, "old.json", ALICE);

    mgraph_cmd(dir.path())
        .arg("merge")
        .arg("person")
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"age\": 31"))
        .stdout(predicate::str::contains("Shelbyville"));

    // Target untouched without --write
    let content = fs::read_to_string(&target).unwrap();
    assert!(content.contains("Springfield"));
}

#[test]
fn test_merge_json_reports_changed_paths() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "new.json", ALICE_OLDER);
    let target = write(&dir, "old.json", ALICE);

    let output = mgraph_cmd(dir.path())
        .args(["--format", "json", "merge", "person"])
        .arg(&source)
        .arg(&target)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["record"]["age"], 31);
    let changed: Vec<&str> = json["changed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert_eq!(changed, vec!["age", "address.city"]);
}

#[test]
fn test_merge_write_updates_target() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "new.json", ALICE_OLDER);
    let target = write(&dir, "old.json", ALICE);

    mgraph_cmd(dir.path())
        .args(["merge", "person", "--write"])
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 change(s)"));

    let merged: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(merged["age"], 31);
    assert_eq!(merged["address"]["city"], "Shelbyville");

    // Now equal
    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&source)
        .arg(&target)
        .assert()
        .success();
}

#[test]
fn test_merge_verbose_lists_changes() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "new.json", ALICE_OLDER);
    let target = write(&dir, "old.json", ALICE);

    mgraph_cmd(dir.path())
        .args(["-v", "merge", "person"])
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:merge] changed address.city"));
}

#[test]
fn test_merge_identical_reports_no_changes() {
    let dir = TempDir::new().unwrap();
    let source = write(&dir, "new.json", ALICE);
    let target = write(&dir, "old.json", ALICE);

    mgraph_cmd(dir.path())
        .args(["merge", "person", "--write"])
        .arg(&source)
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 change(s)"));
}

// =============================================================================
// Copy
// =============================================================================

#[test]
fn test_copy_to_other_format() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "alice.json", ALICE);
    let dest = dir.path().join("out/alice.toml");

    mgraph_cmd(dir.path())
        .args(["copy", "person"])
        .arg(&file)
        .arg("--output")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied"));

    let content = fs::read_to_string(&dest).unwrap();
    assert!(content.contains("name = \"Alice\""));

    mgraph_cmd(dir.path())
        .arg("equal")
        .arg("person")
        .arg(&file)
        .arg(&dest)
        .assert()
        .success();
}

#[test]
fn test_copy_json_has_no_skipped_nodes() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "acme.json",
        r#"{
  "name": "Acme",
  "headquarters": { "street": "1 Road", "city": "Metropolis", "postal_code": "999" },
  "employees": [{ "name": "Bob", "age": 40 }],
  "departments": { "eng": ["Bob"] },
  "quarterly_revenue": [1, 2, 3, 4]
}"#,
    );

    let output = mgraph_cmd(dir.path())
        .args(["--format", "json", "copy", "company"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["record"]["employees"][0]["name"], "Bob");
    assert_eq!(json["record"]["quarterly_revenue"][3], 4);
    assert_eq!(json["skipped"].as_array().unwrap().len(), 0);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_project_config_sets_output_format() {
    let dir = TempDir::new().unwrap();
    write(&dir, "mgraph.toml", "[output]\nformat = \"json\"\n");

    let output = mgraph_cmd(dir.path())
        .args(["members", "address"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "address");
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    write(&dir, "mgraph.toml", "[engine]\nmax_depth = 0\n");

    mgraph_cmd(dir.path())
        .args(["members", "address"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_depth"));
}

#[test]
fn test_explicit_config_flag() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "custom.toml", "[output]\nformat = \"json\"\n");

    mgraph_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["members", "user"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\":\"user\""));
}
