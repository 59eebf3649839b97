//! Core ledger logic
//!
//! - `traits` - Identifier allocation abstraction
//! - `sequence` - Counter-backed sequence and block allocators
//! - `registry` - Account registration
//! - `engine` - Deposits and withdrawals
//! - `balance` - Unlocked balance and history reads
//! - `ledger` - Facade dispatching typed requests
//! - `batch_processor` - Concurrent batch execution partitioned by account

pub mod balance;
pub mod batch_processor;
pub mod engine;
pub mod ledger;
pub mod registry;
pub mod sequence;
pub mod traits;

pub use balance::BalanceReader;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::TransactionEngine;
pub use ledger::{Ledger, LedgerConfig};
pub use registry::{AccountRegistry, ACCOUNT_NUMBER_COUNTER};
pub use sequence::{Allocator, BlockAllocator, SequenceAllocator};
pub use traits::IdAllocator;
