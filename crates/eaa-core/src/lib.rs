//! Core data model for the EAA command-line harness
//!
//! Test cases, captured process results, query time windows and the single
//! error type shared by every crate in the workspace.

use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Byte range in a command string, used to locate syntax errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Seconds since the Unix epoch, truncated
#[must_use]
pub fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Bounds of a log query, in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: u64,
    pub end: u64,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Window of length `span` that closes at `end`
    #[must_use]
    pub const fn trailing(end: u64, span: Duration) -> Self {
        Self {
            start: end.saturating_sub(span.as_secs()),
            end,
        }
    }

    /// Window of length `span` that closes at the current wall-clock time
    #[must_use]
    pub fn ending_now(span: Duration) -> Self {
        Self::trailing(now_epoch_secs(), span)
    }

    #[must_use]
    pub const fn length(&self) -> Duration {
        Duration::from_secs(self.end.saturating_sub(self.start))
    }
}

/// Which credentials file the CLI is pointed at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    /// Use whatever the harness configuration supplies (possibly nothing)
    #[default]
    Inherit,
    /// Always pass `-e <path>`, ignoring the configured edgerc
    Override(String),
}

/// A property the CLI output must satisfy
#[derive(Debug, Clone)]
pub enum Expectation {
    /// At least one line on stdout; `message` explains what was expected
    NonEmptyOutput { message: String },
    /// Exact process exit code
    ExitCode(i32),
    /// Regex search over stdout
    MatchesPattern(Regex),
    /// Literal substring of stdout
    ContainsSubstring(String),
    /// Every non-blank stdout line is a JSON object
    JsonLines,
}

impl Expectation {
    #[must_use]
    pub fn non_empty(message: impl Into<String>) -> Self {
        Self::NonEmptyOutput {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::ContainsSubstring(text.into())
    }

    /// Compile `pattern` into a stdout predicate
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::InvalidPattern` if the regex does not compile
    pub fn pattern(pattern: &str) -> Result<Self, HarnessError> {
        Regex::new(pattern)
            .map(Self::MatchesPattern)
            .map_err(|source| HarnessError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonEmptyOutput { .. } => write!(f, "non-empty stdout"),
            Self::ExitCode(code) => write!(f, "exit code {code}"),
            Self::MatchesPattern(regex) => write!(f, "stdout matches /{}/", regex.as_str()),
            Self::ContainsSubstring(text) => write!(f, "stdout contains {text:?}"),
            Self::JsonLines => write!(f, "stdout is JSON lines"),
        }
    }
}

/// A named scenario run against the CLI
#[derive(Debug, Clone)]
pub struct TestCase {
    pub group: String,
    pub name: String,
    pub description: String,
    pub args: Vec<String>,
    pub credentials: Credentials,
    pub expectations: Vec<Expectation>,
    /// `None` falls back to the harness default
    pub timeout: Option<Duration>,
}

impl TestCase {
    #[must_use]
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            description: String::new(),
            args: Vec::new(),
            credentials: Credentials::Inherit,
            expectations: Vec::new(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append one argument in its textual form
    #[must_use]
    pub fn arg(mut self, arg: impl fmt::Display) -> Self {
        self.args.push(arg.to_string());
        self
    }

    #[must_use]
    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: fmt::Display,
    {
        self.args.extend(args.into_iter().map(|arg| arg.to_string()));
        self
    }

    /// Append `--start <start> --end <end>`
    #[must_use]
    pub fn window(self, window: TimeWindow) -> Self {
        self.arg("--start")
            .arg(window.start)
            .arg("--end")
            .arg(window.end)
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `group::name`, the identifier used for filtering and reports
    #[must_use]
    pub fn id(&self) -> String {
        format!("{}::{}", self.group, self.name)
    }

    /// True if the case passes any command-line flag named `flag`
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|arg| arg == flag)
    }
}

/// Captured output of a finished child process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub stdout: String,
    pub stderr: String,
    /// `-1` when the process was terminated by a signal
    pub code: i32,
}

impl ProcessResult {
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.stdout.lines().count()
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Lifecycle of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestState {
    Built,
    Spawned,
    Collected,
    Asserted,
    Passed,
    Failed,
}

impl TestState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Built => "built",
            Self::Spawned => "spawned",
            Self::Collected => "collected",
            Self::Asserted => "asserted",
            Self::Passed => "ok",
            Self::Failed => "FAIL",
        };
        f.write_str(label)
    }
}

/// Errors raised while building, running or checking a CLI invocation
#[derive(thiserror::Error, Debug)]
pub enum HarnessError {
    #[error("ERR_SPAWN: cannot start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ERR_WAIT: lost track of `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ERR_TIMEOUT: `{command}` did not finish within {}s", timeout.as_secs_f64())]
    Timeout { command: String, timeout: Duration },

    #[error("ERR_EXIT_CODE: return code must be {expected}, got {actual}")]
    ExitCodeMismatch { expected: i32, actual: i32 },

    #[error("ERR_EMPTY_OUTPUT: {message}")]
    EmptyOutput { message: String },

    #[error("ERR_PATTERN: stdout does not match /{pattern}/: {output:?}")]
    PatternMismatch { pattern: String, output: String },

    #[error("ERR_PATTERN: invalid regex {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("ERR_SUBSTRING: {needle:?} not found in stdout")]
    MissingSubstring { needle: String },

    #[error("ERR_JSON: stdout line {line} is not a JSON object: {reason}")]
    InvalidJson { line: usize, reason: String },

    #[error("ERR_SYNTAX: {message} at offset {}", span.start)]
    CommandSyntax { message: String, span: Span },

    #[error("ERR_SYNTAX: base command is empty")]
    EmptyCommand,

    #[error("ERR_IO: {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ERR_CONFIG: {key}: {message}")]
    Config { key: String, message: String },
}

impl HarnessError {
    /// Stable short identifier, used by machine-readable reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => "spawn",
            Self::Wait { .. } => "wait",
            Self::Timeout { .. } => "timeout",
            Self::ExitCodeMismatch { .. } => "exit_code",
            Self::EmptyOutput { .. } => "empty_output",
            Self::PatternMismatch { .. } | Self::InvalidPattern { .. } => "pattern",
            Self::MissingSubstring { .. } => "substring",
            Self::InvalidJson { .. } => "json",
            Self::CommandSyntax { .. } | Self::EmptyCommand => "syntax",
            Self::Io { .. } => "io",
            Self::Config { .. } => "config",
        }
    }

    /// Build an `InvalidJson` error from a `serde_json` failure
    #[must_use]
    pub fn invalid_json(line: usize, source: &serde_json::Error) -> Self {
        Self::InvalidJson {
            line,
            reason: source.to_string(),
        }
    }
}
