//! Error types for the ledger core
//!
//! This module defines every error a ledger operation can return to its caller.
//!
//! # Error Categories
//!
//! - **Caller errors**: invalid input, duplicate identity, unknown account,
//!   insufficient funds. Never retried; the message says what to correct.
//! - **Store failures**: allocation and persistence failures. The unit of work
//!   has been rolled back in full, so retrying is safe. Only a diagnostic code
//!   from the store is exposed.

use super::account::AccountId;
use crate::store::StoreError;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Identity attribute that must be unique across accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    NationalId,
    Phone,
    AccountId,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdentityField::NationalId => "national_id",
            IdentityField::Phone => "phone",
            IdentityField::AccountId => "account_id",
        })
    }
}

/// Main error type for the ledger core
///
/// Each variant includes enough context for the caller to correct the request
/// (caller errors) or a diagnostic code (store failures).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Malformed, missing or non-positive field
    #[error("Invalid {field}: {reason}")]
    InvalidInput {
        /// Name of the offending field
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// A registrant with the same identity already exists
    ///
    /// Returned both by the advisory pre-check and when the store's
    /// uniqueness constraint rejects the insert.
    #[error("An account with this {field} is already registered")]
    DuplicateIdentity {
        /// The identity attribute that collided
        field: IdentityField,
    },

    /// The referenced account does not exist
    #[error("Account {account_id} not found")]
    NotFound {
        /// Requested account
        account_id: AccountId,
    },

    /// Withdrawal exceeds the current balance
    ///
    /// The balance is left unchanged and no record is written.
    #[error(
        "Insufficient funds in account {account_id}: balance {balance}, requested {requested}"
    )]
    InsufficientFunds {
        account_id: AccountId,
        balance: Decimal,
        requested: Decimal,
    },

    /// The sequence allocator could not produce a value
    #[error("Failed to allocate from counter '{counter}' ({code})")]
    AllocationFailed {
        /// Counter name
        counter: String,
        /// Diagnostic code
        code: &'static str,
    },

    /// The store failed to complete a unit of work
    #[error("Persistence failure ({code})")]
    PersistenceFailure {
        /// Diagnostic code
        code: &'static str,
    },
}

impl From<StoreError> for LedgerError {
    fn from(error: StoreError) -> Self {
        LedgerError::PersistenceFailure { code: error.code() }
    }
}

impl LedgerError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a DuplicateIdentity error
    pub fn duplicate_identity(field: IdentityField) -> Self {
        LedgerError::DuplicateIdentity { field }
    }

    /// Create a NotFound error
    pub fn not_found(account_id: &AccountId) -> Self {
        LedgerError::NotFound {
            account_id: account_id.clone(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        account_id: &AccountId,
        balance: Decimal,
        requested: Decimal,
    ) -> Self {
        LedgerError::InsufficientFunds {
            account_id: account_id.clone(),
            balance,
            requested,
        }
    }

    /// Create an AllocationFailed error
    pub fn allocation_failed(counter: &str, code: &'static str) -> Self {
        LedgerError::AllocationFailed {
            counter: counter.to_string(),
            code,
        }
    }

    /// Whether the caller has to change the request before trying again
    pub fn is_caller_error(&self) -> bool {
        !self.is_retryable()
    }

    /// Whether the failure came from the store and may succeed on retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::AllocationFailed { .. } | LedgerError::PersistenceFailure { .. }
        )
    }
}
