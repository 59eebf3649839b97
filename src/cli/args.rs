use crate::core::LedgerConfig;
use crate::store::StoreConfig;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Apply account registrations, deposits and withdrawals from a CSV file
#[derive(Parser, Debug)]
#[command(name = "ledger-core")]
#[command(
    about = "Apply account registrations, deposits and withdrawals from a CSV file",
    long_about = None
)]
pub struct CliArgs {
    /// Input CSV file path containing ledger requests
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "concurrent",
        help = "Processing strategy: 'sequential' for one request at a time or 'concurrent' \
                for parallel batches"
    )]
    pub strategy: StrategyType,

    /// Number of requests per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of requests per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (concurrent mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        help = "Longest wait for a row lock in milliseconds (default: 5000)"
    )]
    pub lock_timeout_ms: Option<u64>,

    #[arg(
        long = "id-block-size",
        value_name = "COUNT",
        default_value_t = 1,
        help = "Account identifiers reserved per counter lock (1 disables reservation)"
    )]
    pub id_block_size: usize,

    /// Log filter directive; overrides RUST_LOG
    #[arg(long = "log-level", value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, ValueEnum)]
pub enum StrategyType {
    Sequential,
    Concurrent,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments, defaulting absent values
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.worker_threads.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.worker_threads.unwrap_or(default.worker_threads),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a LedgerConfig from CLI arguments, defaulting absent values
    pub fn to_ledger_config(&self) -> LedgerConfig {
        let store = match self.lock_timeout_ms {
            Some(millis) => StoreConfig::new(Duration::from_millis(millis)),
            None => StoreConfig::default(),
        };

        LedgerConfig {
            store,
            id_block_size: self.id_block_size,
        }
    }
}
