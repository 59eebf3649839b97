//! Embedded transactional ledger store
//!
//! The store owns every persisted row: accounts (with their transaction
//! history), the unique identity indexes and the named sequence counters.
//!
//! # Access model
//!
//! - **Unlocked reads** (`account`, `history`, `find_by_identity`, ...) see
//!   committed state only. An account's balance and its history are published
//!   together in a single map entry, so a reader never sees one without the
//!   other.
//! - **Writes** go through a [`UnitOfWork`]: rows are locked exclusively,
//!   writes are staged, and `commit` validates every constraint before applying
//!   anything. Dropping a unit of work rolls it back and releases its locks.
//!
//! # Constraints
//!
//! | Name | Kind | Rule |
//! |---|---|---|
//! | `accounts_pkey` | unique | account identifier |
//! | `accounts_national_id_key` | unique | national identity number |
//! | `accounts_phone_key` | unique | phone number |
//! | `accounts_balance_check` | check | balance >= 0 |
//! | `transactions_amount_check` | check | record amount > 0 |
//! | `ledger_entries_match_balance` | check | per account, balance delta == signed records |
//! | `counters_value_check` | check | counter value never decreases |

pub mod error;
mod lock_table;
mod unit_of_work;

pub use error::StoreError;
pub use unit_of_work::UnitOfWork;

use crate::types::{Account, AccountId, IdentityField, TransactionRecord};
use dashmap::DashMap;
use lock_table::LockTable;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub const ACCOUNTS_PKEY: &str = "accounts_pkey";
pub const ACCOUNTS_NATIONAL_ID_KEY: &str = "accounts_national_id_key";
pub const ACCOUNTS_PHONE_KEY: &str = "accounts_phone_key";
pub const ACCOUNTS_BALANCE_CHECK: &str = "accounts_balance_check";
pub const TRANSACTIONS_AMOUNT_CHECK: &str = "transactions_amount_check";
pub const LEDGER_ENTRIES_CHECK: &str = "ledger_entries_match_balance";
pub const COUNTERS_VALUE_CHECK: &str = "counters_value_check";

/// Store configuration
#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Longest time a unit of work waits for a row lock
    pub lock_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Create a StoreConfig, falling back to the default for a zero timeout
    pub fn new(lock_timeout: Duration) -> Self {
        if lock_timeout.is_zero() {
            let default = Self::default();
            warn!(
                default_ms = default.lock_timeout.as_millis() as u64,
                "invalid lock timeout (0ms), using default"
            );
            return default;
        }

        Self { lock_timeout }
    }
}

/// Committed account row: the account and its append-only history
#[derive(Debug)]
struct AccountRow {
    account: Account,
    history: Vec<TransactionRecord>,
}

/// Transactional store for accounts, history and counters
///
/// Share it behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct LedgerStore {
    config: StoreConfig,
    accounts: DashMap<AccountId, AccountRow>,
    national_ids: DashMap<String, AccountId>,
    phones: DashMap<String, AccountId>,
    counters: DashMap<String, i64>,
    account_locks: LockTable<AccountId>,
    counter_locks: LockTable<String>,
    /// Serializes the constraint check and apply of account inserts
    unique_index: Mutex<()>,
    next_record_id: AtomicU64,
    next_unit_id: AtomicU64,
    available: AtomicBool,
}

impl LedgerStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            accounts: DashMap::new(),
            national_ids: DashMap::new(),
            phones: DashMap::new(),
            counters: DashMap::new(),
            account_locks: LockTable::new("accounts"),
            counter_locks: LockTable::new("counters"),
            unique_index: Mutex::new(()),
            next_record_id: AtomicU64::new(0),
            next_unit_id: AtomicU64::new(0),
            available: AtomicBool::new(true),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Start a new unit of work
    ///
    /// # Errors
    ///
    /// * `StoreError::Unavailable` - If the store has been closed
    pub fn begin(&self) -> Result<UnitOfWork<'_>, StoreError> {
        self.ensure_available()?;
        let id = self.next_unit_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(UnitOfWork::new(self, id))
    }

    /// Mark the store unavailable
    ///
    /// Units of work that have not committed yet fail at commit and roll back;
    /// new ones cannot be started.
    pub fn close(&self) {
        self.available.store(false, Ordering::SeqCst);
        info!("ledger store closed");
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    /// Committed snapshot of an account
    pub fn account(&self, account_id: &AccountId) -> Option<Account> {
        self.accounts
            .get(account_id)
            .map(|row| row.value().account.clone())
    }

    /// Committed transaction history of an account, in commit order
    pub fn history(&self, account_id: &AccountId) -> Option<Vec<TransactionRecord>> {
        self.accounts
            .get(account_id)
            .map(|row| row.value().history.clone())
    }

    /// Committed snapshot of all accounts, in arbitrary order
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|row| row.value().account.clone())
            .collect()
    }

    /// Committed value of a counter, `None` if it was never used
    pub fn counter(&self, name: &str) -> Option<i64> {
        self.counters.get(name).map(|value| *value.value())
    }

    /// Unlocked lookup of an identity collision
    ///
    /// Returns the first colliding field. The answer may be stale by the time
    /// the caller acts on it; inserts are checked again at commit.
    pub fn find_by_identity(&self, national_id: &str, phone: &str) -> Option<IdentityField> {
        if self.national_ids.contains_key(national_id) {
            Some(IdentityField::NationalId)
        } else if self.phones.contains_key(phone) {
            Some(IdentityField::Phone)
        } else {
            None
        }
    }
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
