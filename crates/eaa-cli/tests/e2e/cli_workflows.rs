//! E2E tests for `eaa-harness run` and `eaa-harness list`
#![cfg(unix)]

use std::process::{Command, Output};

const CLI_BINARY: &str = env!("CARGO_BIN_EXE_eaa-harness");
const FAKE_CLI: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../tests/fixtures/fake-akamai-eaa.sh"
);

fn fake_cli() -> String {
    format!("sh '{FAKE_CLI}'")
}

fn run_command(args: &[&str]) -> Output {
    Command::new(CLI_BINARY)
        .args(args)
        .env_remove("EAA_CLI")
        .env_remove("EAA_EDGERC")
        .env_remove("EAA_TIMEOUT_SECS")
        .env_remove("EAA_STRICT_JSON")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|_| panic!("Failed to execute {CLI_BINARY}"))
}

#[test]
fn test_run_all_scenarios() {
    let cli = fake_cli();
    let output = run_command(&["run", "--cli", &cli]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("events::useraccess_log_raw ... ok"));
    assert!(stdout.contains("cli::no_edgerc ... ok"));
    assert!(stdout.contains("Ran 10 tests"));
    assert!(stdout.ends_with("OK\n"));
}

#[test]
fn test_run_reads_cli_from_environment() {
    let output = Command::new(CLI_BINARY)
        .args(["run", "-k", "cli::cli_version"])
        .env("EAA_CLI", fake_cli())
        .env_remove("EAA_EDGERC")
        .env_remove("EAA_TIMEOUT_SECS")
        .env_remove("EAA_STRICT_JSON")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Ran 1 test in"));
}

#[test]
fn test_failures_set_exit_code() {
    let cli = fake_cli();
    let output = run_command(&["run", "--cli", &cli, "-e", "/nonexistent/.edgerc"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAIL: cli::cli_info"));
    assert!(stdout.contains("ERR_EXIT_CODE: return code must be 0, got 2"));
    assert!(stdout.contains("FAILED (failures=9)"));
}

#[test]
fn test_json_report() {
    let cli = fake_cli();
    let output = run_command(&["run", "--cli", &cli, "--strict-json", "--format", "json", "-k", "json"]);

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["passed"], 2);
    assert_eq!(report["failed"], 0);
    assert_eq!(report["cases"][0]["id"], "events::useraccess_log_json");
    assert_eq!(report["cases"][1]["id"], "connectors::list_connectors_json");
}

#[test]
fn test_unknown_filter_is_an_error() {
    let cli = fake_cli();
    let output = run_command(&["run", "--cli", &cli, "-k", "no-such-scenario"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no scenario matches"));
}

#[test]
fn test_unterminated_cli_quote() {
    let output = run_command(&["run", "--cli", "python3 'bin/akamai-eaa"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid --cli command"));
    assert!(stderr.contains("unterminated quote"));
}

#[test]
fn test_missing_executable_is_reported_per_case() {
    let output = run_command(&["run", "--cli", "/nonexistent/akamai-eaa", "-k", "cli::cli_info"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("ERR_SPAWN"));
}

#[test]
fn test_list_scenarios() {
    let output = run_command(&["list", "--cli", "akamai-eaa", "-e", "/ci/.edgerc"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 10);
    assert!(lines.contains(&"cli::no_edgerc\takamai-eaa -e file_not_exist"));
    assert!(lines.contains(&"connectors::list_connectors_json\takamai-eaa -e /ci/.edgerc c list --json"));
}

#[test]
fn test_requires_subcommand() {
    let output = run_command(&[]);
    assert!(!output.status.success());
}
