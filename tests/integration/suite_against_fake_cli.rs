//! The full catalogue against the stand-in CLI
#![cfg(unix)]

use super::fixture::{fake_cli_command, fake_config};
use eaa_core::{HarnessError, TestCase, TestState};
use eaa_runner::{HarnessConfig, Runner};
use eaa_suite::SuiteContext;
use std::time::Duration;
use tempfile::NamedTempFile;

fn run_all(config: HarnessConfig) -> eaa_runner::SuiteReport {
    let runner = Runner::new(config).unwrap();
    runner.run_suite(&eaa_suite::all(&SuiteContext::now()))
}

#[test]
fn test_catalogue_passes_against_healthy_cli() {
    let report = run_all(fake_config());

    assert_eq!(report.cases.len(), 10);
    for case in &report.cases {
        assert!(case.passed(), "{} failed: {:?}", case.id, case.error);
        assert_eq!(case.reached, TestState::Asserted);
    }
    assert!(report.render_text().ends_with("OK\n"));
}

#[test]
fn test_strict_json_passes_against_healthy_cli() {
    let report = run_all(HarnessConfig {
        strict_json: true,
        ..fake_config()
    });
    assert!(report.all_passed(), "{}", report.render_text());
}

#[test]
fn test_configured_edgerc_is_forwarded() {
    let edgerc = NamedTempFile::new().unwrap();
    let report = run_all(HarnessConfig {
        edgerc: Some(edgerc.path().to_str().unwrap().to_string()),
        ..fake_config()
    });

    assert!(report.all_passed(), "{}", report.render_text());
    let info = report.find("cli::cli_info").unwrap();
    assert!(info.command.contains(" -e "));
}

#[test]
fn test_missing_configured_edgerc_fails_everything_but_banner() {
    let report = run_all(HarnessConfig {
        edgerc: Some("/nonexistent/.edgerc".to_string()),
        ..fake_config()
    });

    assert_eq!(report.passed(), 1);
    assert!(report.find("cli::no_edgerc").unwrap().passed());
    assert!(matches!(
        report.find("cli::cli_info").unwrap().error,
        Some(HarnessError::ExitCodeMismatch {
            expected: 0,
            actual: 2
        })
    ));
    assert!(matches!(
        report.find("cli::cli_version").unwrap().error,
        Some(HarnessError::PatternMismatch { .. })
    ));
}

#[test]
fn test_empty_account_reports_each_listing() {
    let report = run_all(HarnessConfig {
        cli: format!("env FAKE_EAA_EMPTY=1 {}", fake_cli_command()),
        ..HarnessConfig::default()
    });

    let empty: Vec<&str> = report
        .cases
        .iter()
        .filter(|case| matches!(case.error, Some(HarnessError::EmptyOutput { .. })))
        .map(|case| case.id.as_str())
        .collect();
    assert_eq!(
        empty,
        vec![
            "events::useraccess_log_raw",
            "events::admin_log_raw",
            "events::useraccess_log_json",
            "application::search",
            "connectors::list_connectors",
            "connectors::list_connectors_json",
            "identity::list_directories",
        ]
    );
    assert_eq!(report.failed(), 7);

    let text = report.render_text();
    assert!(text.contains("We expect at least one connector to be configured"));
    assert!(text.ends_with("FAILED (failures=7)\n"));
}

#[test]
fn test_filter_selects_group() {
    let report = run_all(HarnessConfig {
        filters: vec!["connectors::".to_string()],
        ..fake_config()
    });

    let ids: Vec<&str> = report.cases.iter().map(|case| case.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["connectors::list_connectors", "connectors::list_connectors_json"]
    );
}

#[test]
fn test_hung_cli_times_out_and_suite_continues() {
    let runner = Runner::new(fake_config()).unwrap();
    let cases = vec![
        TestCase::new("events", "hung")
            .args(["sleep", "30"])
            .timeout(Duration::from_millis(300)),
        eaa_suite::general().remove(2),
    ];

    let report = runner.run_suite(&cases);
    assert!(matches!(
        report.cases[0].error,
        Some(HarnessError::Timeout { .. })
    ));
    assert!(report.cases[1].passed());
    assert!(report.elapsed < Duration::from_secs(20));
}
