//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete request processing
//! pipelines, covering both CSV parsing and ledger execution. Different
//! implementations (sequential, concurrent batches) are selected at runtime.

use crate::cli::StrategyType;
use crate::core::{LedgerConfig, ProcessingResult};
use std::io::Write;
use std::path::Path;
use tracing::{debug, warn};

pub mod concurrent;
pub mod sequential;

pub use concurrent::{BatchConfig, ConcurrentProcessingStrategy};
pub use sequential::SequentialProcessingStrategy;

/// Processing strategy trait for complete request processing pipelines
///
/// Each strategy reads requests from a CSV file, executes them against a
/// fresh ledger and writes the final account states to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process requests from `input_path` and write account states to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed, including when individual requests
    ///   were rejected
    /// * `Err(String)` if a fatal error occurred (file not found, I/O error,
    ///   runtime creation)
    ///
    /// Rejected requests are logged and processing continues with the next one.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Sequential or concurrent processing
/// * `ledger` - Configuration of the ledger the strategy executes against
/// * `batch` - Batch configuration (ignored by the sequential strategy)
pub fn create_strategy(
    strategy_type: StrategyType,
    ledger: LedgerConfig,
    batch: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sequential => Box::new(SequentialProcessingStrategy::new(ledger)),
        StrategyType::Concurrent => Box::new(ConcurrentProcessingStrategy::new(
            ledger,
            batch.unwrap_or_default(),
        )),
    }
}

/// Log the outcome of one processed request
pub(crate) fn log_result(processed: &ProcessingResult) {
    match &processed.result {
        Ok(outcome) => debug!(op = processed.request.operation(), ?outcome, "request applied"),
        Err(e) => warn!(
            op = processed.request.operation(),
            caller_error = e.is_caller_error(),
            error = %e,
            "request rejected"
        ),
    }
}
