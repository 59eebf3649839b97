//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account and account identifier
//! - `transaction`: Transaction records and entry kinds
//! - `request`: Typed ledger requests and outcomes
//! - `error`: Error types returned to ledger callers

pub mod account;
pub mod error;
pub mod request;
pub mod transaction;

pub use account::{Account, AccountId, ACCOUNT_ID_WIDTH};
pub use error::{IdentityField, LedgerError};
pub use request::{LedgerOutcome, LedgerRequest};
pub use transaction::{EntryKind, RecordId, TransactionRecord};
