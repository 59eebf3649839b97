//! Ledger CLI
//!
//! Command-line interface applying account registrations, deposits and
//! withdrawals from a CSV file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- requests.csv > accounts.csv
//! cargo run -- --strategy sequential requests.csv > accounts.csv
//! cargo run -- --batch-size 2000 --max-concurrent 8 requests.csv > accounts.csv
//! cargo run -- --id-block-size 64 --log-level info requests.csv > accounts.csv
//! ```
//!
//! The final account states are written to stdout as CSV; logs go to stderr.
//!
//! # Processing Strategies
//!
//! - **sequential**: Requests applied one at a time in file order
//! - **concurrent**: Batches processed with per-account parallelism (default)
//!
//! # Exit Codes
//!
//! - 0: Success (individual rejected requests are logged, not fatal)
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use ledger_core::cli;
use ledger_core::strategy;
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();
    cli::init_logging(args.log_level.as_deref());

    let strategy = {
        let batch = match args.strategy {
            cli::StrategyType::Concurrent => Some(args.to_batch_config()),
            cli::StrategyType::Sequential => None,
        };
        strategy::create_strategy(args.strategy.clone(), args.to_ledger_config(), batch)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "processing failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
