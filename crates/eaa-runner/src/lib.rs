//! EAA harness runner
//!
//! Builds argument vectors for the CLI under test, runs each invocation as
//! an owned child process with a timeout, and checks the collected output.

pub mod assertions;
pub mod command;
pub mod config;
pub mod files;
pub mod process;
pub mod report;
pub mod runner;

pub use command::{CliCommand, build_command};
pub use config::HarnessConfig;
pub use process::RunningProcess;
pub use report::{CaseReport, SuiteReport};
pub use runner::Runner;
