//! Argument vectors for the CLI under test

use eaa_core::{Credentials, HarnessError, TestCase};
use std::fmt::Display;

/// Flag the EAA CLI takes for an alternate credentials file
pub const EDGERC_FLAG: &str = "-e";

/// Base executable plus `args`, each argument in its textual form
pub fn build_command<I>(base: &[String], args: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Display,
{
    base.iter()
        .cloned()
        .chain(args.into_iter().map(|arg| arg.to_string()))
        .collect()
}

/// The executable words that precede every invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCommand {
    base: Vec<String>,
}

impl CliCommand {
    /// Split a configured command string such as `python3 bin/akamai-eaa`
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::CommandSyntax` for bad quoting and
    /// `HarnessError::EmptyCommand` if no words remain
    pub fn parse(command: &str) -> Result<Self, HarnessError> {
        let base = eaa_lexer::split(command)?;
        if base.is_empty() {
            return Err(HarnessError::EmptyCommand);
        }
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(&self) -> &[String] {
        &self.base
    }

    pub fn build<I>(&self, args: I) -> Vec<String>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        build_command(&self.base, args)
    }

    /// Full argv for `case`, with the credentials flag resolved
    #[must_use]
    pub fn for_case(&self, case: &TestCase, edgerc: Option<&str>) -> Vec<String> {
        let credentials = match &case.credentials {
            Credentials::Override(path) => Some(path.as_str()),
            Credentials::Inherit => edgerc,
        };
        let prefix = credentials
            .into_iter()
            .flat_map(|path| [EDGERC_FLAG, path]);
        self.build(prefix.chain(case.args.iter().map(String::as_str)))
    }
}
