//! Deposits and withdrawals
//!
//! This module provides the `TransactionEngine`, which applies balance
//! mutations to the ledger store.
//!
//! # Design
//!
//! Each mutation is one unit of work:
//!
//! ```text
//! begin → lock account row → check → adjust balance (delta) → append record → commit
//! ```
//!
//! The account row is locked exclusively for the whole unit of work, so the
//! insufficient-funds check and the update see the same balance. The balance
//! change and its transaction record are committed together or not at all.
//!
//! # Thread Safety
//!
//! The engine holds no state besides the shared store and can be cloned into
//! any number of tasks. Mutations of different accounts never contend.

use crate::store::{LedgerStore, StoreError};
use crate::types::{AccountId, EntryKind, LedgerError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Applies credits and debits atomically with their transaction records
#[derive(Debug, Clone)]
pub struct TransactionEngine {
    store: Arc<LedgerStore>,
}

impl TransactionEngine {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Credit `amount` to an account
    ///
    /// # Returns
    ///
    /// * `Ok(Decimal)` - The new balance
    /// * `Err(LedgerError::InvalidInput)` - `amount` is zero or negative
    /// * `Err(LedgerError::NotFound)` - No such account
    /// * `Err(LedgerError::PersistenceFailure)` - Lock timeout or failed commit
    pub async fn deposit(
        &self,
        account_id: &AccountId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.apply(account_id, EntryKind::Credit, amount).await
    }

    /// Debit `amount` from an account
    ///
    /// # Returns
    ///
    /// * `Ok(Decimal)` - The new balance
    /// * `Err(LedgerError::InvalidInput)` - `amount` is zero or negative
    /// * `Err(LedgerError::NotFound)` - No such account
    /// * `Err(LedgerError::InsufficientFunds)` - `amount` exceeds the balance;
    ///   nothing is debited and no record is written
    /// * `Err(LedgerError::PersistenceFailure)` - Lock timeout or failed commit
    pub async fn withdraw(
        &self,
        account_id: &AccountId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.apply(account_id, EntryKind::Debit, amount).await
    }

    async fn apply(
        &self,
        account_id: &AccountId,
        kind: EntryKind,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        ensure_positive(amount)?;

        let failed = |e: StoreError| {
            error!(
                account_id = %account_id,
                %kind,
                code = e.code(),
                error = %e,
                "balance mutation failed"
            );
            LedgerError::from(e)
        };

        let mut uow = self.store.begin().map_err(failed)?;
        let Some(account) = uow.lock_account(account_id).await.map_err(failed)? else {
            warn!(account_id = %account_id, %kind, "account not found");
            return Err(LedgerError::not_found(account_id));
        };

        if kind == EntryKind::Debit && account.balance < amount {
            warn!(
                account_id = %account_id,
                balance = %account.balance,
                requested = %amount,
                "insufficient funds"
            );
            return Err(LedgerError::insufficient_funds(
                account_id,
                account.balance,
                amount,
            ));
        }

        let delta = kind.signed(amount);
        let balance = account.balance.checked_add(delta).ok_or_else(|| {
            LedgerError::invalid_input("amount", "would overflow the account balance")
        })?;

        uow.adjust_balance(account_id, delta).map_err(failed)?;
        uow.append_record(account_id, kind, amount).map_err(failed)?;
        uow.commit().await.map_err(failed)?;

        info!(
            account_id = %account_id,
            %kind,
            amount = %amount,
            balance = %balance,
            "balance updated"
        );
        Ok(balance)
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), LedgerError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        warn!(amount = %amount, "rejected non-positive amount");
        Err(LedgerError::invalid_input(
            "amount",
            format!("must be greater than zero, got {amount}"),
        ))
    }
}
