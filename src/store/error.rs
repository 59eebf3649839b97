//! Store-level failures
//!
//! These never reach ledger callers directly: components translate them into
//! [`crate::types::LedgerError`], keeping only the diagnostic [`StoreError::code`].

use std::time::Duration;
use thiserror::Error;

/// Failure of a store primitive or of a unit of work
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A row lock could not be acquired within the configured timeout
    #[error("Timed out after {waited_ms}ms waiting for lock on {row}")]
    LockTimeout {
        /// Locked row, e.g. `accounts(0000000001)`
        row: String,
        /// How long the unit of work waited
        waited_ms: u64,
    },

    /// An insert would duplicate a unique key
    #[error("Unique constraint '{constraint}' violated")]
    UniqueViolation { constraint: &'static str },

    /// A staged write breaks a check constraint
    #[error("Check constraint '{constraint}' violated")]
    CheckViolation { constraint: &'static str },

    /// A write targets a row the unit of work has not locked
    #[error("{row} is not locked by this unit of work")]
    NotLocked { row: String },

    /// The store has been closed
    #[error("Store is unavailable")]
    Unavailable,
}

impl StoreError {
    /// Create a LockTimeout error
    pub fn lock_timeout(row: impl Into<String>, waited: Duration) -> Self {
        StoreError::LockTimeout {
            row: row.into(),
            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Stable diagnostic code, safe to show to callers
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::LockTimeout { .. } => "LOCK_TIMEOUT",
            StoreError::UniqueViolation { .. } => "UNIQUE_VIOLATION",
            StoreError::CheckViolation { .. } => "CHECK_VIOLATION",
            StoreError::NotLocked { .. } => "NOT_LOCKED",
            StoreError::Unavailable => "STORE_UNAVAILABLE",
        }
    }
}
