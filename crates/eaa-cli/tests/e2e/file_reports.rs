//! E2E tests for the `lines` and `duplicates` file reports

use std::fs;
use std::process::Command;
use tempfile::NamedTempFile;

const CLI_BINARY: &str = env!("CARGO_BIN_EXE_eaa-harness");

#[test]
fn test_lines() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(&temp_file, "evt-1\nevt-2\nevt-3").unwrap();

    let output = Command::new(CLI_BINARY)
        .arg("lines")
        .arg(temp_file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3");
}

#[test]
fn test_duplicates() {
    let temp_file = NamedTempFile::new().unwrap();
    fs::write(&temp_file, "evt-1\nevt-2\nevt-1 \nevt-3\nevt-1\nevt-3\n").unwrap();

    let output = Command::new(CLI_BINARY)
        .arg("duplicates")
        .arg(temp_file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "DUPLICATE[3] evt-1\nDUPLICATE[2] evt-3\n2 duplicated line(s)\n"
    );
}

#[test]
fn test_missing_file() {
    let output = Command::new(CLI_BINARY)
        .args(["lines", "nonexistent_export.log"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nonexistent_export.log"));
}
