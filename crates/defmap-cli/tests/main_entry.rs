//! Integration tests for the `defmap` binary entry point.
//!
//! Drives the binary through temporary files and checks the user-facing
//! output and exit status.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::{contains, starts_with};
use tempfile::TempDir;

const SOURCE: &str = "import math\n\ndef area(r):\n    \"\"\"Area of a circle.\"\"\"\n    return math.pi * r ** 2\n\nTOTAL = area(2)\n";

fn defmap(dir: &TempDir) -> assert_cmd::Command {
    let mut command = cargo_bin_cmd!("defmap");
    command
        .current_dir(dir.path())
        .env_remove("DEFMAP_INDENT_WIDTH")
        .env_remove("DEFMAP_LOG_FORMAT")
        .env("DEFMAP_LOG_FILTER", "warn");
    command
}

#[test]
fn help_succeeds() {
    let dir = TempDir::new().expect("temporary directory");
    defmap(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("rebuild"));
}

#[test]
fn extract_and_rebuild_round_trip() {
    let dir = TempDir::new().expect("temporary directory");
    fs::write(dir.path().join("area.py"), SOURCE).expect("write source");

    defmap(&dir)
        .args(["extract", "area.py", "--output", "area.json"])
        .assert()
        .success();
    let document = fs::read_to_string(dir.path().join("area.json")).expect("document");
    assert!(document.contains("\"Area of a circle.\""), "{document}");

    defmap(&dir)
        .args(["rebuild", "area.json"])
        .assert()
        .success()
        .stdout(contains("def area(r):\n    \"\"\"Area of a circle.\"\"\"\n"))
        .stdout(contains("TOTAL = area(2)"));
}

#[test]
fn indent_width_flag_precedes_the_command() {
    let dir = TempDir::new().expect("temporary directory");
    fs::write(dir.path().join("area.py"), SOURCE).expect("write source");
    defmap(&dir)
        .args(["extract", "area.py", "-o", "area.json"])
        .assert()
        .success();

    defmap(&dir)
        .args(["--indent-width", "2", "rebuild", "area.json"])
        .assert()
        .success()
        .stdout(contains("def area(r):\n  \"\"\"Area of a circle.\"\"\"\n  return"));
}

#[test]
fn missing_source_exits_with_failure() {
    let dir = TempDir::new().expect("temporary directory");
    defmap(&dir)
        .args(["extract", "absent.py"])
        .assert()
        .failure()
        .stderr(starts_with("io error"));
}

#[test]
fn malformed_documents_are_structure_errors() {
    let dir = TempDir::new().expect("temporary directory");
    fs::write(dir.path().join("bad.json"), "invalid json").expect("write document");

    defmap(&dir)
        .args(["rebuild", "bad.json"])
        .assert()
        .failure()
        .stderr(contains("structure error"));
}
