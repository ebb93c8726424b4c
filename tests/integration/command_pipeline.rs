//! Command string → argv → child process, with no shell in between
#![cfg(unix)]

use super::fixture::FAKE_CLI;
use eaa_core::{ProcessResult, TestCase, TimeWindow};
use eaa_runner::{CliCommand, RunningProcess};
use proptest::prelude::*;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn run(command: &CliCommand, args: &[String]) -> ProcessResult {
    RunningProcess::spawn(&command.build(args))
        .unwrap()
        .wait(Some(Duration::from_secs(10)))
        .unwrap()
}

#[test]
fn test_cli_path_with_spaces() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("cli eaa").join("bin");
    fs::create_dir_all(&nested).unwrap();
    let script = nested.join("akamai eaa");
    fs::copy(FAKE_CLI, &script).unwrap();

    let command = CliCommand::parse(&format!(
        "sh {}",
        eaa_lexer::quote(script.to_str().unwrap())
    ))
    .unwrap();
    assert_eq!(command.base().len(), 2);

    let result = run(&command, &["version".to_string()]);
    assert_eq!(result.stdout, "0.6.3\n");
    assert!(result.success());
}

#[test]
fn test_numeric_arguments_reach_cli() {
    let command = CliCommand::parse(&super::fixture::fake_cli_command()).unwrap();
    let case = TestCase::new("events", "access")
        .args(["log", "access"])
        .window(TimeWindow::new(100, 200));

    let argv = command.for_case(&case, None);
    assert_eq!(argv[argv.len() - 4..], ["--start", "100", "--end", "200"]);

    let result = RunningProcess::spawn(&argv)
        .unwrap()
        .wait(Some(Duration::from_secs(10)))
        .unwrap();
    assert_eq!(result.stdout, "200 access event\n");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn arguments_arrive_verbatim(args in prop::collection::vec("[^\\x00\\r\\n]{0,12}", 1..5)) {
        let command = CliCommand::parse(r#"sh -c 'printf "%s\n" "$@"' echo-args"#).unwrap();
        let result = run(&command, &args);

        let echoed: Vec<String> = result.stdout.lines().map(str::to_string).collect();
        prop_assert_eq!(echoed, args);
    }
}
