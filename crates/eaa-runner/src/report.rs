//! Outcome of a suite run, as text or JSON

use eaa_core::{HarnessError, TestState};
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::time::Duration;

const RULE_HEAVY: &str =
    "======================================================================";
const RULE_LIGHT: &str =
    "----------------------------------------------------------------------";

/// Whole milliseconds, saturating at `u64::MAX`
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[derive(Debug)]
pub struct CaseReport {
    pub id: String,
    pub description: String,
    /// Shell-quoted argv, empty if the command could not be built
    pub command: String,
    /// Last lifecycle stage reached before the verdict
    pub reached: TestState,
    /// `Passed` or `Failed`
    pub state: TestState,
    pub elapsed: Duration,
    pub error: Option<HarnessError>,
}

impl CaseReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.state == TestState::Passed
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "description": self.description,
            "command": self.command,
            "state": if self.passed() { "passed" } else { "failed" },
            "reached": self.reached.to_string(),
            "elapsed_ms": millis(self.elapsed),
            "error": self.error.as_ref().map(|err| json!({
                "kind": err.kind(),
                "message": err.to_string(),
            })),
        })
    }
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
    pub elapsed: Duration,
}

impl SuiteReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|case| case.passed()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|case| case.id == id)
    }

    /// unittest-style summary: one line per case, then failure details
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for case in &self.cases {
            let _ = writeln!(out, "{} ... {}", case.id, case.state);
        }

        for case in self.cases.iter().filter(|case| !case.passed()) {
            let _ = writeln!(out, "\n{RULE_HEAVY}\nFAIL: {}", case.id);
            if !case.description.is_empty() {
                let _ = writeln!(out, "{}", case.description);
            }
            let _ = writeln!(out, "{RULE_LIGHT}");
            if !case.command.is_empty() {
                let _ = writeln!(out, "SHELL COMMAND: {}", case.command);
            }
            if let Some(err) = &case.error {
                let _ = writeln!(out, "{err} (after {})", case.reached);
            }
        }

        let _ = writeln!(
            out,
            "{RULE_LIGHT}\nRan {} test{} in {:.3}s\n",
            self.cases.len(),
            if self.cases.len() == 1 { "" } else { "s" },
            self.elapsed.as_secs_f64()
        );
        if self.all_passed() {
            out.push_str("OK\n");
        } else {
            let _ = writeln!(out, "FAILED (failures={})", self.failed());
        }
        out
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "passed": self.passed(),
            "failed": self.failed(),
            "elapsed_ms": millis(self.elapsed),
            "cases": self.cases.iter().map(CaseReport::to_json).collect::<Vec<_>>(),
        })
    }
}
