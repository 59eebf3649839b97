//! Account-related types for the ledger core
//!
//! This module defines the Account structure and the fixed-width account
//! identifier minted by the account registry.

use rust_decimal::Decimal;
use std::fmt;

/// Number of digits in a formatted account identifier
pub const ACCOUNT_ID_WIDTH: usize = 10;

/// Fixed-width, zero-padded account identifier
///
/// Identifiers minted by the registry are always exactly [`ACCOUNT_ID_WIDTH`]
/// digits long (e.g. `0000000042`). Identifiers supplied by callers are kept
/// verbatim; one that was never minted simply does not match any account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    /// Format a sequence value into an account identifier
    ///
    /// # Returns
    ///
    /// * `Some(AccountId)` - The zero-padded identifier
    /// * `None` - If the value is negative or needs more than ten digits
    pub fn from_sequence(value: i64) -> Option<Self> {
        if value < 0 {
            return None;
        }

        let formatted = format!("{:0width$}", value, width = ACCOUNT_ID_WIDTH);
        (formatted.len() == ACCOUNT_ID_WIDTH).then_some(Self(formatted))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Registered holder of funds
///
/// `balance` is never negative in a committed state and only changes
/// through the transaction engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Identifier minted at registration, immutable afterwards
    pub account_id: AccountId,

    /// Holder's display name
    pub name: String,

    /// National identity number, unique across all accounts
    pub national_id: String,

    /// Phone number, unique across all accounts
    pub phone: String,

    /// Current committed balance
    pub balance: Decimal,
}

impl Account {
    /// Create a new account with a zero balance
    pub fn new(
        account_id: AccountId,
        name: impl Into<String>,
        national_id: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Account {
            account_id,
            name: name.into(),
            national_id: national_id.into(),
            phone: phone.into(),
            balance: Decimal::ZERO,
        }
    }
}
