//! Transaction record types for the ledger core
//!
//! Every committed balance change is documented by exactly one
//! [`TransactionRecord`]. Records are append-only.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Store-assigned record identifier
pub type RecordId = u64;

/// Direction of a balance mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Increase of the balance (deposit)
    Credit,

    /// Decrease of the balance (withdrawal)
    Debit,
}

impl EntryKind {
    /// Apply the direction to a positive amount
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            EntryKind::Credit => amount,
            EntryKind::Debit => -amount,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Credit => "credit",
            EntryKind::Debit => "debit",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable audit entry for one balance mutation
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Identifier assigned at commit
    pub id: RecordId,

    /// Account whose balance changed
    pub account_id: AccountId,

    /// Positive amount of the mutation
    pub amount: Decimal,

    /// Credit or debit
    pub kind: EntryKind,

    /// Commit time (UTC)
    pub timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Amount with the sign of its direction applied
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::credit(EntryKind::Credit, Decimal::new(1005, 1))]
    #[case::debit(EntryKind::Debit, Decimal::new(-1005, 1))]
    fn test_signed_amount(#[case] kind: EntryKind, #[case] expected: Decimal) {
        let record = TransactionRecord {
            id: 1,
            account_id: AccountId::from("0000000001"),
            amount: Decimal::new(1005, 1),
            kind,
            timestamp: Utc::now(),
        };

        assert_eq!(record.signed_amount(), expected);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EntryKind::Credit.to_string(), "credit");
        assert_eq!(EntryKind::Debit.to_string(), "debit");
    }
}
