//! Sequential processing strategy
//!
//! Requests are streamed from the file by `SyncReader` and executed one at a
//! time, in file order, on a single-threaded tokio runtime. Identifiers are
//! therefore minted in file order and the output is fully deterministic.

use crate::core::{Ledger, LedgerConfig, ProcessingResult};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{log_result, ProcessingStrategy};
use std::io::Write;
use std::path::Path;
use tracing::warn;

/// Single-threaded strategy applying requests in file order
#[derive(Debug, Clone)]
pub struct SequentialProcessingStrategy {
    config: LedgerConfig,
}

impl SequentialProcessingStrategy {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SequentialProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let reader = SyncReader::new(input_path)?;
        let ledger = Ledger::new(self.config.clone());

        // Row locks wait with a timeout, so the time driver is required
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            for next in reader {
                match next {
                    Ok(request) => {
                        let result = ledger.execute(request.clone()).await;
                        log_result(&ProcessingResult { request, result });
                    }
                    Err(e) => warn!(error = %e, "skipping invalid row"),
                }
            }
        });

        write_accounts_csv(&ledger.accounts(), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(rows: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "op,account_id,name,national_id,phone,amount\n{rows}")
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(rows: &str) -> String {
        let file = create_temp_csv(rows);
        let mut output = Vec::new();
        SequentialProcessingStrategy::new(LedgerConfig::default())
            .process(file.path(), &mut output)
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_identifiers_follow_file_order() {
        let output = run(
            "register,,Bob,N2,P2,\n\
             register,,Alice,N1,P1,\n\
             deposit,0000000002,,,,5\n",
        );

        assert_eq!(
            output,
            "account_id,name,national_id,phone,balance\n\
             0000000001,Bob,N2,P2,0.0000\n\
             0000000002,Alice,N1,P1,5.0000\n"
        );
    }

    #[test]
    fn test_rejected_requests_do_not_stop_processing() {
        let output = run(
            "register,,Alice,N1,P1,\n\
             withdraw,0000000001,,,,1\n\
             deposit,0000000001,,,,oops\n\
             register,,Mallory,N1,P9,\n\
             deposit,0000000001,,,,3\n",
        );

        assert_eq!(
            output,
            "account_id,name,national_id,phone,balance\n0000000001,Alice,N1,P1,3.0000\n"
        );
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = SequentialProcessingStrategy::new(LedgerConfig::default())
            .process(Path::new("does-not-exist.csv"), &mut Vec::new());

        assert!(result.unwrap_err().contains("Failed to open file"));
    }
}
