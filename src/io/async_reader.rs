//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over ledger requests from a CSV file.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - Batch reading so that each batch can be handed to the batch processor
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of LedgerRequests
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::LedgerRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader
///
/// Malformed rows are logged and skipped, memory usage is bounded by the
/// batch size.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
        }
    }

    /// Read up to `batch_size` requests
    ///
    /// # Returns
    ///
    /// The successfully converted requests, in file order. An empty vector
    /// means the end of the input was reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<LedgerRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(next) = records.next().await else {
                break;
            };
            self.line_num += 1;

            match next {
                Ok(csv_record) => match convert_csv_record(csv_record) {
                    Ok(request) => batch.push(request),
                    Err(e) => warn!(line = self.line_num, error = %e, "skipping invalid request"),
                },
                Err(e) => warn!(line = self.line_num, error = %e, "skipping malformed CSV row"),
            }
        }

        batch
    }
}
