//! Shared helpers for driving `tests/fixtures/fake-akamai-eaa.sh`

use eaa_runner::HarnessConfig;

pub const FAKE_CLI: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/fake-akamai-eaa.sh"
);

/// Base command that runs the stand-in through `sh`
pub fn fake_cli_command() -> String {
    format!("sh {}", eaa_lexer::quote(FAKE_CLI))
}

pub fn fake_config() -> HarnessConfig {
    HarnessConfig {
        cli: fake_cli_command(),
        ..HarnessConfig::default()
    }
}
