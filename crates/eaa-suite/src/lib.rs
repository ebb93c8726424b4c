//! Scenario catalogue for the `akamai-eaa` command line
//!
//! Every scenario assumes a populated test tenant: recent user access
//! events, at least one admin event in the last two weeks, applications,
//! connectors and a cloud directory.

use eaa_core::{Credentials, Expectation, TestCase, TimeWindow, now_epoch_secs};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Window for user access events
pub const ACCESS_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Admin events are rare, so they get two weeks
pub const ADMIN_WINDOW: Duration = Duration::from_secs(14 * 24 * 60 * 60);
/// Budget for a single log fetch
pub const LOG_TIMEOUT: Duration = Duration::from_secs(60);

/// Credentials path that must not exist
pub const MISSING_EDGERC: &str = "file_not_exist";
pub const USAGE_BANNER: &str = "usage: akamai eaa";

pub static VERSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+\n$").expect("version pattern compiles"));

const RETURN_CODE_OK: Expectation = Expectation::ExitCode(0);

/// Time snapshot shared by every scenario of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteContext {
    pub access: TimeWindow,
    pub admin: TimeWindow,
}

impl SuiteContext {
    /// Both windows close at `now` (epoch seconds)
    #[must_use]
    pub const fn at(now: u64) -> Self {
        Self {
            access: TimeWindow::trailing(now, ACCESS_WINDOW),
            admin: TimeWindow::trailing(now, ADMIN_WINDOW),
        }
    }

    #[must_use]
    pub fn now() -> Self {
        Self::at(now_epoch_secs())
    }
}

/// User and admin log events
#[must_use]
pub fn events(ctx: &SuiteContext) -> Vec<TestCase> {
    let access_events = "We expect at least one user access event";
    vec![
        TestCase::new("events", "useraccess_log_raw")
            .describe("Fetch User Access log events (RAW format)")
            .args(["log", "access"])
            .window(ctx.access)
            .timeout(LOG_TIMEOUT)
            .expect(Expectation::non_empty(access_events))
            .expect(RETURN_CODE_OK),
        TestCase::new("events", "admin_log_raw")
            .describe("Fetch Admin log events (RAW format)")
            .args(["log", "admin"])
            .window(ctx.admin)
            .timeout(LOG_TIMEOUT)
            .expect(Expectation::non_empty("We expect at least one admin event"))
            .expect(RETURN_CODE_OK),
        TestCase::new("events", "useraccess_log_json")
            .describe("Fetch User Access log events (JSON format)")
            .args(["log", "access"])
            .window(ctx.access)
            .arg("--json")
            .timeout(LOG_TIMEOUT)
            .expect(Expectation::non_empty(access_events))
            .expect(RETURN_CODE_OK),
    ]
}

#[must_use]
pub fn applications() -> Vec<TestCase> {
    vec![
        TestCase::new("application", "search")
            .describe("Search for all applications in the account")
            .arg("search")
            .expect(Expectation::non_empty(
                "We expect at least one application to be configured",
            ))
            .expect(RETURN_CODE_OK),
    ]
}

#[must_use]
pub fn connectors() -> Vec<TestCase> {
    let message = "We expect at least one connector to be configured";
    vec![
        TestCase::new("connectors", "list_connectors")
            .describe("List all connectors in the account (RAW)")
            .arg("c")
            .expect(Expectation::non_empty(message))
            .expect(RETURN_CODE_OK),
        TestCase::new("connectors", "list_connectors_json")
            .describe("List all connectors in the account (JSON)")
            .args(["c", "list", "--json"])
            .expect(Expectation::non_empty(message))
            .expect(RETURN_CODE_OK),
    ]
}

#[must_use]
pub fn identity() -> Vec<TestCase> {
    vec![
        TestCase::new("identity", "list_directories")
            .describe("List identity directories")
            .args(["dir", "list"])
            .expect(Expectation::non_empty(
                "We expect at least one directory (cloud directory) to be configured",
            ))
            .expect(RETURN_CODE_OK),
    ]
}

/// Version, tenant info and the bad-credentials banner
#[must_use]
pub fn general() -> Vec<TestCase> {
    vec![
        // The exit code is not part of the contract here, only the banner.
        TestCase::new("cli", "no_edgerc")
            .describe("Call CLI with a bogus edgerc file, help should be displayed")
            .credentials(Credentials::Override(MISSING_EDGERC.to_string()))
            .expect(Expectation::contains(USAGE_BANNER)),
        TestCase::new("cli", "cli_version")
            .describe("Ensure version of the CLI is displayed")
            .arg("version")
            .expect(Expectation::MatchesPattern(VERSION_PATTERN.clone()))
            .expect(RETURN_CODE_OK),
        TestCase::new("cli", "cli_info")
            .describe("Display tenant info")
            .arg("info")
            .expect(RETURN_CODE_OK),
    ]
}

/// Every scenario, in run order
#[must_use]
pub fn all(ctx: &SuiteContext) -> Vec<TestCase> {
    let mut cases = events(ctx);
    cases.extend(applications());
    cases.extend(connectors());
    cases.extend(identity());
    cases.extend(general());
    cases
}
