//! Read-only balance and history lookups
//!
//! Reads take no row locks. They observe the latest committed state: an
//! in-flight mutation is seen either entirely or not at all.

use crate::store::LedgerStore;
use crate::types::{AccountId, LedgerError, TransactionRecord};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct BalanceReader {
    store: Arc<LedgerStore>,
}

impl BalanceReader {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Current committed balance of an account
    pub fn balance_of(&self, account_id: &AccountId) -> Result<Decimal, LedgerError> {
        self.store
            .account(account_id)
            .map(|account| account.balance)
            .ok_or_else(|| LedgerError::not_found(account_id))
    }

    /// Committed transaction records of an account, oldest first
    pub fn history(&self, account_id: &AccountId) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.store
            .history(account_id)
            .ok_or_else(|| LedgerError::not_found(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransactionEngine;
    use crate::types::{Account, EntryKind};

    #[tokio::test]
    async fn test_balance_and_history_follow_commits() {
        let store = Arc::new(LedgerStore::default());
        let id = AccountId::from("0000000001");
        let mut uow = store.begin().unwrap();
        uow.insert_account(Account::new(id.clone(), "Alice", "N1", "P1"));
        uow.commit().await.unwrap();

        let reader = BalanceReader::new(Arc::clone(&store));
        let engine = TransactionEngine::new(Arc::clone(&store));
        assert_eq!(reader.balance_of(&id), Ok(Decimal::ZERO));

        engine.deposit(&id, Decimal::new(75, 0)).await.unwrap();
        engine.withdraw(&id, Decimal::new(25, 0)).await.unwrap();

        let history = reader.history(&id).unwrap();
        assert_eq!(reader.balance_of(&id), Ok(Decimal::new(50, 0)));
        assert_eq!(
            history.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![EntryKind::Credit, EntryKind::Debit]
        );
        assert!(history[0].id < history[1].id);
    }

    #[test]
    fn test_unknown_account_is_not_found() {
        let reader = BalanceReader::new(Arc::new(LedgerStore::default()));
        let missing = AccountId::from("0000000404");

        assert_eq!(reader.balance_of(&missing), Err(LedgerError::not_found(&missing)));
        assert_eq!(reader.history(&missing), Err(LedgerError::not_found(&missing)));
    }
}
