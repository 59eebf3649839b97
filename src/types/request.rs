//! Typed ledger requests and their successful outcomes

use super::account::AccountId;
use rust_decimal::Decimal;

/// A single request against the ledger
///
/// Requests are produced by the request layer (see [`crate::io`]) after the
/// required fields have been checked for presence. Amount positivity is
/// checked by the ledger itself.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerRequest {
    /// Open a new account with a zero balance
    Register {
        name: String,
        national_id: String,
        phone: String,
    },

    /// Credit funds to an account
    Deposit { account_id: AccountId, amount: Decimal },

    /// Debit funds from an account (requires a sufficient balance)
    Withdraw { account_id: AccountId, amount: Decimal },

    /// Read the current balance of an account
    Balance { account_id: AccountId },
}

impl LedgerRequest {
    /// Short operation name used in logs
    pub fn operation(&self) -> &'static str {
        match self {
            LedgerRequest::Register { .. } => "register",
            LedgerRequest::Deposit { .. } => "deposit",
            LedgerRequest::Withdraw { .. } => "withdraw",
            LedgerRequest::Balance { .. } => "balance",
        }
    }

    /// Target account, if the request addresses an existing one
    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            LedgerRequest::Register { .. } => None,
            LedgerRequest::Deposit { account_id, .. }
            | LedgerRequest::Withdraw { account_id, .. }
            | LedgerRequest::Balance { account_id } => Some(account_id),
        }
    }
}

/// Successful result of a [`LedgerRequest`]
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerOutcome {
    /// A new account was created
    Registered { account_id: AccountId },

    /// A deposit or withdrawal committed; carries the new balance
    BalanceChanged { account_id: AccountId, balance: Decimal },

    /// Result of a balance query
    Balance { account_id: AccountId, balance: Decimal },
}
