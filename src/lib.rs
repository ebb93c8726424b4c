//! EAA command-line acceptance harness
//!
//! Facade over the workspace crates. The `eaa-harness` binary lives in
//! `crates/eaa-cli`.

pub use eaa_core as model;
pub use eaa_lexer as lexer;
pub use eaa_runner as runner;
pub use eaa_suite as suite;
