//! Ledger facade
//!
//! `Ledger` wires the store, the account registry, the transaction engine and
//! the balance reader together and dispatches typed [`LedgerRequest`]s.
//!
//! # Architecture
//!
//! ```text
//! Ledger
//!     ├── Arc<LedgerStore>               (accounts, history, counters)
//!     ├── AccountRegistry<Allocator>     (register)
//!     ├── TransactionEngine              (deposit, withdraw)
//!     └── BalanceReader                  (balance, history)
//! ```

use super::balance::BalanceReader;
use super::engine::TransactionEngine;
use super::registry::AccountRegistry;
use super::sequence::Allocator;
use crate::store::{LedgerStore, StoreConfig};
use crate::types::{
    Account, AccountId, LedgerError, LedgerOutcome, LedgerRequest, TransactionRecord,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Configuration for a [`Ledger`]
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerConfig {
    /// Store settings (lock timeout)
    pub store: StoreConfig,
    /// Identifiers reserved per counter lock acquisition (1 = no reservation)
    pub id_block_size: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            id_block_size: 1,
        }
    }
}

/// Entry point for all ledger operations
#[derive(Debug)]
pub struct Ledger {
    store: Arc<LedgerStore>,
    registry: AccountRegistry<Allocator>,
    engine: TransactionEngine,
    reader: BalanceReader,
}

impl Ledger {
    /// Create a ledger over a fresh store
    pub fn new(config: LedgerConfig) -> Self {
        let store = Arc::new(LedgerStore::new(config.store));
        Self::with_store(store, config.id_block_size)
    }

    /// Create a ledger over an existing store
    pub fn with_store(store: Arc<LedgerStore>, id_block_size: usize) -> Self {
        Self {
            registry: AccountRegistry::new(
                Arc::clone(&store),
                Allocator::new(Arc::clone(&store), id_block_size),
            ),
            engine: TransactionEngine::new(Arc::clone(&store)),
            reader: BalanceReader::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }

    pub async fn register(
        &self,
        name: &str,
        national_id: &str,
        phone: &str,
    ) -> Result<AccountId, LedgerError> {
        self.registry.register(name, national_id, phone).await
    }

    pub async fn deposit(
        &self,
        account_id: &AccountId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.engine.deposit(account_id, amount).await
    }

    pub async fn withdraw(
        &self,
        account_id: &AccountId,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        self.engine.withdraw(account_id, amount).await
    }

    pub fn balance_of(&self, account_id: &AccountId) -> Result<Decimal, LedgerError> {
        self.reader.balance_of(account_id)
    }

    pub fn history(&self, account_id: &AccountId) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.reader.history(account_id)
    }

    /// Committed snapshot of all accounts, in arbitrary order
    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    /// Dispatch a single request
    pub async fn execute(&self, request: LedgerRequest) -> Result<LedgerOutcome, LedgerError> {
        match request {
            LedgerRequest::Register {
                name,
                national_id,
                phone,
            } => {
                let account_id = self.register(&name, &national_id, &phone).await?;
                Ok(LedgerOutcome::Registered { account_id })
            }
            LedgerRequest::Deposit { account_id, amount } => {
                let balance = self.deposit(&account_id, amount).await?;
                Ok(LedgerOutcome::BalanceChanged {
                    account_id,
                    balance,
                })
            }
            LedgerRequest::Withdraw { account_id, amount } => {
                let balance = self.withdraw(&account_id, amount).await?;
                Ok(LedgerOutcome::BalanceChanged {
                    account_id,
                    balance,
                })
            }
            LedgerRequest::Balance { account_id } => {
                let balance = self.balance_of(&account_id)?;
                Ok(LedgerOutcome::Balance {
                    account_id,
                    balance,
                })
            }
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_balance_is_zero() {
        let ledger = Ledger::default();

        let account_id = ledger.register("Alice", "N1", "P1").await.unwrap();

        assert_eq!(ledger.balance_of(&account_id), Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_execute_dispatches_every_request_kind() {
        let ledger = Ledger::default();

        let registered = ledger
            .execute(LedgerRequest::Register {
                name: "Alice".to_string(),
                national_id: "N1".to_string(),
                phone: "P1".to_string(),
            })
            .await;
        let account_id = AccountId::from("0000000001");
        assert_eq!(
            registered,
            Ok(LedgerOutcome::Registered {
                account_id: account_id.clone()
            })
        );

        let deposited = ledger
            .execute(LedgerRequest::Deposit {
                account_id: account_id.clone(),
                amount: Decimal::new(100, 0),
            })
            .await;
        assert_eq!(
            deposited,
            Ok(LedgerOutcome::BalanceChanged {
                account_id: account_id.clone(),
                balance: Decimal::new(100, 0)
            })
        );

        let withdrawn = ledger
            .execute(LedgerRequest::Withdraw {
                account_id: account_id.clone(),
                amount: Decimal::new(30, 0),
            })
            .await;
        assert_eq!(
            withdrawn,
            Ok(LedgerOutcome::BalanceChanged {
                account_id: account_id.clone(),
                balance: Decimal::new(70, 0)
            })
        );

        let balance = ledger
            .execute(LedgerRequest::Balance {
                account_id: account_id.clone(),
            })
            .await;
        assert_eq!(
            balance,
            Ok(LedgerOutcome::Balance {
                account_id,
                balance: Decimal::new(70, 0)
            })
        );
    }

    #[tokio::test]
    async fn test_block_allocation_config_still_mints_unique_ids() {
        let ledger = Ledger::new(LedgerConfig {
            id_block_size: 4,
            ..LedgerConfig::default()
        });

        let first = ledger.register("A", "N1", "P1").await.unwrap();
        let second = ledger.register("B", "N2", "P2").await.unwrap();

        assert_eq!(first.as_str(), "0000000001");
        assert_eq!(second.as_str(), "0000000002");
        assert_eq!(ledger.store().counter("account_number"), Some(4));
    }
}
