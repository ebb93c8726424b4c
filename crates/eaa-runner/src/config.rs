//! Harness configuration
//!
//! Resolved once per run: built-in defaults, then `EAA_*` environment
//! variables. The binary applies its command-line flags on top.

use eaa_core::{HarnessError, TestCase};
use std::time::Duration;

pub const DEFAULT_CLI: &str = "akamai-eaa";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const ENV_CLI: &str = "EAA_CLI";
pub const ENV_EDGERC: &str = "EAA_EDGERC";
pub const ENV_TIMEOUT: &str = "EAA_TIMEOUT_SECS";
pub const ENV_STRICT_JSON: &str = "EAA_STRICT_JSON";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Command string used to start the CLI, split with shell quoting rules
    pub cli: String,
    /// Passed as `-e <path>` unless a case overrides its credentials
    pub edgerc: Option<String>,
    /// Applied to cases that do not carry their own timeout
    pub default_timeout: Duration,
    /// Also require `--json` invocations to print one JSON object per line
    pub strict_json: bool,
    /// Substrings of `group::name`; empty selects every case
    pub filters: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cli: DEFAULT_CLI.to_string(),
            edgerc: None,
            default_timeout: DEFAULT_TIMEOUT,
            strict_json: false,
            filters: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by the process environment
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Config` if a variable holds an unusable value
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `EAA_*` key
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Config` if a value is unusable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, HarnessError> {
        let mut config = Self::default();

        if let Some(cli) = lookup(ENV_CLI).filter(|value| !value.trim().is_empty()) {
            config.cli = cli;
        }
        config.edgerc = lookup(ENV_EDGERC).filter(|value| !value.is_empty());
        if let Some(value) = lookup(ENV_TIMEOUT) {
            config.default_timeout = parse_timeout(ENV_TIMEOUT, &value)?;
        }
        if let Some(value) = lookup(ENV_STRICT_JSON) {
            config.strict_json = parse_bool(ENV_STRICT_JSON, &value)?;
        }

        Ok(config)
    }

    #[must_use]
    pub fn selects(&self, case: &TestCase) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let id = case.id();
        self.filters.iter().any(|filter| id.contains(filter.as_str()))
    }
}

/// Parse a positive number of seconds, fractions allowed
///
/// # Errors
///
/// Returns `HarnessError::Config` naming `key` if the value is not a
/// positive finite number
pub fn parse_timeout(key: &str, value: &str) -> Result<Duration, HarnessError> {
    let invalid = || HarnessError::Config {
        key: key.to_string(),
        message: format!("expected a positive number of seconds, got {value:?}"),
    };
    let secs: f64 = value.trim().parse().map_err(|_| invalid())?;
    if secs <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

/// # Errors
///
/// Returns `HarnessError::Config` naming `key` for anything but the usual
/// yes/no spellings
pub fn parse_bool(key: &str, value: &str) -> Result<bool, HarnessError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(HarnessError::Config {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}
