//! Sequential suite runner
//!
//! Each case moves Built → Spawned → Collected → Asserted → Passed, or
//! drops to Failed at the first error. A failed case never affects the
//! next one.

use crate::assertions;
use crate::command::CliCommand;
use crate::config::HarnessConfig;
use crate::process::RunningProcess;
use crate::report::{CaseReport, SuiteReport};
use eaa_core::{Expectation, HarnessError, TestCase, TestState};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Runner {
    config: HarnessConfig,
    command: CliCommand,
}

impl Runner {
    /// # Errors
    ///
    /// Returns `HarnessError` if the configured CLI command cannot be split
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        let command = CliCommand::parse(&config.cli)?;
        Ok(Self { config, command })
    }

    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    #[must_use]
    pub fn argv(&self, case: &TestCase) -> Vec<String> {
        self.command.for_case(case, self.config.edgerc.as_deref())
    }

    /// The case's own expectations, plus JSON-lines checking for `--json`
    /// invocations when strict mode is on
    #[must_use]
    pub fn expectations_for(&self, case: &TestCase) -> Vec<Expectation> {
        let mut expectations = case.expectations.clone();
        let already = expectations
            .iter()
            .any(|expectation| matches!(expectation, Expectation::JsonLines));
        if self.config.strict_json && case.has_flag("--json") && !already {
            expectations.push(Expectation::JsonLines);
        }
        expectations
    }

    /// Run every selected case in order
    pub fn run_suite(&self, cases: &[TestCase]) -> SuiteReport {
        let started = Instant::now();
        let cases: Vec<CaseReport> = cases
            .iter()
            .filter(|case| self.config.selects(case))
            .map(|case| self.run_case(case))
            .collect();

        let report = SuiteReport {
            cases,
            elapsed: started.elapsed(),
        };
        info!(
            passed = report.passed(),
            failed = report.failed(),
            "suite finished"
        );
        report
    }

    pub fn run_case(&self, case: &TestCase) -> CaseReport {
        let started = Instant::now();
        let id = case.id();
        let argv = self.argv(case);
        let command = eaa_lexer::join(&argv);
        info!(case = %id, "SHELL COMMAND: {command}");

        let mut reached = TestState::Built;
        let (state, error) = match self.drive(case, &argv, &mut reached) {
            Ok(()) => (TestState::Passed, None),
            Err(err) => {
                warn!(case = %id, stage = %reached, "{err}");
                (TestState::Failed, Some(err))
            }
        };
        debug!(case = %id, %state, "done");

        CaseReport {
            id,
            description: case.description.clone(),
            command,
            reached,
            state,
            elapsed: started.elapsed(),
            error,
        }
    }

    fn drive(
        &self,
        case: &TestCase,
        argv: &[String],
        reached: &mut TestState,
    ) -> Result<(), HarnessError> {
        let process = RunningProcess::spawn(argv)?;
        *reached = TestState::Spawned;
        debug!(case = %case.id(), pid = process.pid(), "spawned");

        let timeout = case.timeout.unwrap_or(self.config.default_timeout);
        let result = process.wait(Some(timeout))?;
        *reached = TestState::Collected;
        debug!(
            case = %case.id(),
            code = result.code,
            lines = result.line_count(),
            "collected"
        );
        if !result.stderr.trim().is_empty() {
            debug!(case = %case.id(), stderr = %result.stderr.trim_end(), "stderr");
        }

        for expectation in self.expectations_for(case) {
            assertions::check(&result, &expectation)?;
        }
        *reached = TestState::Asserted;
        Ok(())
    }
}
