//! EAA harness CLI
//!
//! Runs the `akamai-eaa` acceptance scenarios and reports the outcome.

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use eaa_runner::config::{self, HarnessConfig};
use eaa_runner::{Runner, files};
use eaa_suite::SuiteContext;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn config_args() -> Vec<Arg> {
    vec![
        Arg::new("cli")
            .long("cli")
            .value_name("COMMAND")
            .help("Command that starts the EAA CLI, e.g. \"python3 bin/akamai-eaa\" [env: EAA_CLI]")
            .num_args(1),
        Arg::new("edgerc")
            .short('e')
            .long("edgerc")
            .value_name("PATH")
            .help("Credentials file handed to the CLI with -e [env: EAA_EDGERC]")
            .num_args(1),
        Arg::new("timeout")
            .long("timeout")
            .value_name("SECS")
            .help("Timeout for scenarios without their own [env: EAA_TIMEOUT_SECS]")
            .num_args(1),
        Arg::new("filter")
            .short('k')
            .long("filter")
            .value_name("PATTERN")
            .help("Only scenarios whose group::name contains PATTERN (repeatable)")
            .action(ArgAction::Append),
        Arg::new("strict-json")
            .long("strict-json")
            .help("Require one JSON object per line from --json invocations [env: EAA_STRICT_JSON]")
            .action(ArgAction::SetTrue),
    ]
}

fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .help("Report format")
        .value_parser(["text", "json"])
        .default_value("text")
}

fn file_arg() -> Arg {
    Arg::new("file")
        .value_name("FILE")
        .help("Saved CLI output")
        .required(true)
        .value_parser(clap::value_parser!(PathBuf))
        .index(1)
}

fn cli() -> Command {
    Command::new("eaa-harness")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Acceptance harness for the akamai-eaa command line")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("More log output (repeatable); RUST_LOG takes precedence")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run the scenarios against the CLI")
                .args(config_args())
                .arg(format_arg()),
        )
        .subcommand(
            Command::new("list")
                .about("Print the scenarios and the command each one runs")
                .args(config_args()),
        )
        .subcommand(
            Command::new("lines")
                .about("Count the lines of a file")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("duplicates")
                .about("Report lines that occur more than once in a file")
                .arg(file_arg()),
        )
}

fn init_logging(verbosity: u8) {
    let fallback = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("run", sub)) => HarnessConfig::from_env()
            .map_err(anyhow::Error::from)
            .and_then(|base| run(sub, base)),
        Some(("list", sub)) => HarnessConfig::from_env()
            .map_err(anyhow::Error::from)
            .and_then(|base| list(sub, base)),
        Some(("lines", sub)) => count_lines(sub),
        Some(("duplicates", sub)) => report_duplicates(sub),
        _ => unreachable!("clap requires a subcommand"),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("eaa-harness: {e:#}");
            process::exit(2);
        }
    }
}

/// Apply command-line flags on top of `base`
fn resolve_config(matches: &ArgMatches, mut base: HarnessConfig) -> anyhow::Result<HarnessConfig> {
    if let Some(cli) = matches.get_one::<String>("cli") {
        base.cli.clone_from(cli);
    }
    if let Some(edgerc) = matches.get_one::<String>("edgerc") {
        base.edgerc = Some(edgerc.clone());
    }
    if let Some(timeout) = matches.get_one::<String>("timeout") {
        base.default_timeout = config::parse_timeout("--timeout", timeout)?;
    }
    if let Some(filters) = matches.get_many::<String>("filter") {
        base.filters = filters.cloned().collect();
    }
    if matches.get_flag("strict-json") {
        base.strict_json = true;
    }
    tracing::debug!(
        cli = %base.cli,
        edgerc = ?base.edgerc,
        timeout = ?base.default_timeout,
        strict_json = base.strict_json,
        "resolved configuration"
    );
    Ok(base)
}

fn run(matches: &ArgMatches, base: HarnessConfig) -> anyhow::Result<i32> {
    let config = resolve_config(matches, base)?;
    let runner = Runner::new(config).context("invalid --cli command")?;
    let cases = eaa_suite::all(&SuiteContext::now());

    let report = runner.run_suite(&cases);
    if report.cases.is_empty() {
        anyhow::bail!("no scenario matches the given filters");
    }

    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => println!("{}", serde_json::to_string_pretty(&report.to_json())?),
        _ => print!("{}", report.render_text()),
    }

    Ok(i32::from(!report.all_passed()))
}

fn list(matches: &ArgMatches, base: HarnessConfig) -> anyhow::Result<i32> {
    let config = resolve_config(matches, base)?;
    let runner = Runner::new(config).context("invalid --cli command")?;

    for case in eaa_suite::all(&SuiteContext::now()) {
        if runner.config().selects(&case) {
            println!("{}\t{}", case.id(), eaa_lexer::join(&runner.argv(&case)));
        }
    }
    Ok(0)
}

fn count_lines(matches: &ArgMatches) -> anyhow::Result<i32> {
    let path = file_path(matches)?;
    let count = files::line_count(&path)
        .with_context(|| format!("counting lines of {}", path.display()))?;
    println!("{count}");
    Ok(0)
}

fn report_duplicates(matches: &ArgMatches) -> anyhow::Result<i32> {
    let path = file_path(matches)?;
    let mut stdout = std::io::stdout().lock();
    let total = files::duplicate_count(&path, &mut stdout)
        .with_context(|| format!("scanning {} for duplicates", path.display()))?;
    drop(stdout);
    println!("{total} duplicated line(s)");
    Ok(0)
}

fn file_path(matches: &ArgMatches) -> anyhow::Result<PathBuf> {
    matches
        .get_one::<PathBuf>("file")
        .cloned()
        .context("missing FILE argument")
}
