//! Concurrent batch processing strategy
//!
//! # Architecture
//!
//! ```text
//! ConcurrentProcessingStrategy
//!     ├── BatchConfig (batch_size, worker_threads)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (registration-delimited account partitions)
//!     └── Ledger (shared store, registry, engine)
//! ```
//!
//! Batches are processed one after another so that an account's requests keep
//! their file order across batch boundaries. Inside a batch, each registration
//! runs alone and the requests between two registrations run as one task per
//! account, so the output matches the sequential strategy.

use crate::core::{BatchProcessor, Ledger, LedgerConfig};
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::{log_result, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Configuration for batch processing
#[derive(Clone, Debug, PartialEq)]
pub struct BatchConfig {
    /// Number of requests per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            worker_threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, worker_threads: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let worker_threads = if worker_threads == 0 {
            warn!(
                worker_threads,
                default = default.worker_threads,
                "invalid worker thread count, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            batch_size,
            worker_threads,
        }
    }
}

/// Multi-threaded strategy processing requests in concurrent batches
#[derive(Debug, Clone)]
pub struct ConcurrentProcessingStrategy {
    ledger: LedgerConfig,
    batch: BatchConfig,
}

impl ConcurrentProcessingStrategy {
    pub fn new(ledger: LedgerConfig, batch: BatchConfig) -> Self {
        Self { ledger, batch }
    }
}

impl ProcessingStrategy for ConcurrentProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch.worker_threads)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let ledger = Arc::new(Ledger::new(self.ledger.clone()));
            let processor = BatchProcessor::new(Arc::clone(&ledger));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            loop {
                let batch = reader.read_batch(self.batch.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let size = batch.len();
                let results = processor.process_batch(batch).await;
                results.iter().for_each(log_result);
                debug!(size, "batch processed");
            }

            write_accounts_csv(&ledger.accounts(), output)
        })
    }
}
