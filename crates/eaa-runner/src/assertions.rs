//! Predicates over a collected `ProcessResult`

use eaa_core::{Expectation, HarnessError, ProcessResult};
use regex::Regex;

const EXCERPT_CHARS: usize = 200;

fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let mut out: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        out.push_str("...");
    }
    out
}

/// # Errors
///
/// `HarnessError::EmptyOutput` carrying `message` if stdout has no lines
pub fn assert_non_empty_output(result: &ProcessResult, message: &str) -> Result<(), HarnessError> {
    if result.line_count() == 0 {
        return Err(HarnessError::EmptyOutput {
            message: message.to_string(),
        });
    }
    Ok(())
}

/// # Errors
///
/// `HarnessError::ExitCodeMismatch` if the exit code differs from `expected`
pub fn assert_exit_code(result: &ProcessResult, expected: i32) -> Result<(), HarnessError> {
    if result.code != expected {
        return Err(HarnessError::ExitCodeMismatch {
            expected,
            actual: result.code,
        });
    }
    Ok(())
}

/// Regex search over stdout; anchors in `pattern` apply to the whole text
///
/// # Errors
///
/// `HarnessError::PatternMismatch` if nothing matches
pub fn assert_matches_pattern(result: &ProcessResult, pattern: &Regex) -> Result<(), HarnessError> {
    if !pattern.is_match(&result.stdout) {
        return Err(HarnessError::PatternMismatch {
            pattern: pattern.as_str().to_string(),
            output: excerpt(&result.stdout),
        });
    }
    Ok(())
}

/// # Errors
///
/// `HarnessError::MissingSubstring` if stdout does not contain `text`
pub fn assert_contains_substring(result: &ProcessResult, text: &str) -> Result<(), HarnessError> {
    if !result.stdout.contains(text) {
        return Err(HarnessError::MissingSubstring {
            needle: text.to_string(),
        });
    }
    Ok(())
}

/// Every non-blank stdout line must be a JSON object
///
/// # Errors
///
/// `HarnessError::InvalidJson` naming the first offending line (1-based)
pub fn assert_json_lines(result: &ProcessResult) -> Result<(), HarnessError> {
    for (index, line) in result.stdout.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|source| HarnessError::invalid_json(index + 1, &source))?;
        if !value.is_object() {
            return Err(HarnessError::InvalidJson {
                line: index + 1,
                reason: format!("expected an object, got {}", excerpt(line)),
            });
        }
    }
    Ok(())
}

/// Evaluate one expectation
///
/// # Errors
///
/// Whatever the matching `assert_*` function returns
pub fn check(result: &ProcessResult, expectation: &Expectation) -> Result<(), HarnessError> {
    match expectation {
        Expectation::NonEmptyOutput { message } => assert_non_empty_output(result, message),
        Expectation::ExitCode(code) => assert_exit_code(result, *code),
        Expectation::MatchesPattern(pattern) => assert_matches_pattern(result, pattern),
        Expectation::ContainsSubstring(text) => assert_contains_substring(result, text),
        Expectation::JsonLines => assert_json_lines(result),
    }
}
