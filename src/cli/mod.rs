// CLI module
// Command-line interface, argument parsing and log setup

mod args;

pub use args::{CliArgs, StrategyType};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing input, `--help`), clap prints
/// an error or the help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Install the global tracing subscriber, writing to stderr
///
/// `log_level` takes precedence over `RUST_LOG`; without either only
/// warnings and errors are shown. stdout stays reserved for the account CSV.
pub fn init_logging(log_level: Option<&str>) {
    let filter = match log_level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
