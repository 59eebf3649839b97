//! Batch processing with account-based partitioning
//!
//! This module provides the `BatchProcessor`, which runs a batch of ledger
//! requests concurrently with the same outcome as running them one by one in
//! input order.
//!
//! # Design
//!
//! Registrations split a batch into segments:
//!
//! 1. Requests between two registrations touch existing accounts only. They
//!    are partitioned by account identifier; partitions run concurrently and
//!    requests inside a partition run sequentially.
//! 2. Each registration runs on its own once the segment before it is done.
//!    Identifiers are therefore minted in input order, and no request for an
//!    account moves ahead of the registration that creates it.
//!
//! Requests for different accounts commute, so a batch ends in the state a
//! serial run of the same requests would produce.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<Ledger>   (shared ledger facade)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::ledger::Ledger;
use crate::types::{AccountId, LedgerError, LedgerOutcome, LedgerRequest};
use tracing::error;

/// Result of processing a single request
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The request that was processed
    pub request: LedgerRequest,

    /// The outcome of processing (success or error)
    pub result: Result<LedgerOutcome, LedgerError>,
}

/// A run of a batch that is executed as one step
#[derive(Debug)]
pub enum Segment {
    /// A registration, executed alone
    Registration(LedgerRequest),

    /// Requests on existing accounts, grouped per account in input order
    Accounts(HashMap<AccountId, Vec<LedgerRequest>>),
}

/// Batch processor with account-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    ledger: Arc<Ledger>,
}

impl BatchProcessor {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    /// Split a batch into segments at every registration
    ///
    /// # Guarantees
    ///
    /// - Each request appears in exactly one segment
    /// - Segments follow input order
    /// - Requests for each account keep their input order
    pub fn segment(&self, batch: Vec<LedgerRequest>) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut accounts: HashMap<AccountId, Vec<LedgerRequest>> = HashMap::new();

        for request in batch {
            match request.account_id().cloned() {
                Some(account_id) => accounts.entry(account_id).or_default().push(request),
                None => {
                    if !accounts.is_empty() {
                        segments.push(Segment::Accounts(std::mem::take(&mut accounts)));
                    }
                    segments.push(Segment::Registration(request));
                }
            }
        }

        if !accounts.is_empty() {
            segments.push(Segment::Accounts(accounts));
        }

        segments
    }

    /// Process requests in order; a failed request does not stop the rest
    pub async fn process_account_requests(
        &self,
        requests: Vec<LedgerRequest>,
    ) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(requests.len());

        for request in requests {
            let result = self.ledger.execute(request.clone()).await;
            results.push(ProcessingResult { request, result });
        }

        results
    }

    /// Process a batch segment by segment
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per request of the batch. Results of different
    /// partitions within a segment may be interleaved differently from the
    /// input.
    pub async fn process_batch(&self, batch: Vec<LedgerRequest>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());

        for segment in self.segment(batch) {
            match segment {
                Segment::Registration(request) => {
                    results.extend(self.process_account_requests(vec![request]).await)
                }
                Segment::Accounts(accounts) => {
                    results.extend(self.run_all(accounts.into_values()).await)
                }
            }
        }

        results
    }

    async fn run_all(
        &self,
        partitions: impl Iterator<Item = Vec<LedgerRequest>>,
    ) -> Vec<ProcessingResult> {
        let tasks: Vec<_> = partitions
            .map(|requests| {
                let processor = self.clone();
                tokio::spawn(async move { processor.process_account_requests(requests).await })
            })
            .collect();

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(partition_results) => results.extend(partition_results),
                Err(e) => error!(error = %e, "partition task failed"),
            }
        }

        results
    }
}
