//! Units of work: staged writes applied atomically at commit
//!
//! A `UnitOfWork` collects exclusive row locks and staged writes. Nothing is
//! visible to other units of work or to unlocked readers until `commit`
//! succeeds. Every constraint is checked before the first write is applied,
//! and applying cannot fail, so a commit either applies everything or nothing.
//!
//! Locks are owned guards stored in the unit of work, so they are released
//! when it is committed, rolled back, or dropped on an error path.

use super::lock_table::RowGuard;
use super::{
    AccountRow, LedgerStore, StoreError, ACCOUNTS_BALANCE_CHECK, ACCOUNTS_NATIONAL_ID_KEY,
    ACCOUNTS_PHONE_KEY, ACCOUNTS_PKEY, COUNTERS_VALUE_CHECK, LEDGER_ENTRIES_CHECK,
    TRANSACTIONS_AMOUNT_CHECK,
};
use crate::types::{Account, AccountId, EntryKind, TransactionRecord};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use tracing::debug;

/// Record staged for insertion at commit
#[derive(Debug)]
struct PendingRecord {
    account_id: AccountId,
    kind: EntryKind,
    amount: Decimal,
}

/// Atomic unit of store work
///
/// Obtained from [`LedgerStore::begin`]. Either [`commit`](Self::commit) it
/// or let it go: dropping an uncommitted unit of work is a rollback.
pub struct UnitOfWork<'s> {
    store: &'s LedgerStore,
    id: u64,
    account_guards: HashMap<AccountId, RowGuard>,
    counter_guards: HashMap<String, RowGuard>,
    inserts: Vec<Account>,
    deltas: HashMap<AccountId, Decimal>,
    records: Vec<PendingRecord>,
    counters: HashMap<String, i64>,
    finished: bool,
}

impl<'s> UnitOfWork<'s> {
    pub(super) fn new(store: &'s LedgerStore, id: u64) -> Self {
        Self {
            store,
            id,
            account_guards: HashMap::new(),
            counter_guards: HashMap::new(),
            inserts: Vec::new(),
            deltas: HashMap::new(),
            records: Vec::new(),
            counters: HashMap::new(),
            finished: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Lock an existing account row exclusively and read it
    ///
    /// The returned snapshot includes balance changes already staged by this
    /// unit of work. The lock is held until the unit of work ends.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Account))` - The row is locked
    /// * `Ok(None)` - No such account; nothing was locked
    /// * `Err(StoreError::LockTimeout)` - Another unit of work held the row too long
    pub async fn lock_account(
        &mut self,
        account_id: &AccountId,
    ) -> Result<Option<Account>, StoreError> {
        self.store.ensure_available()?;

        if !self.account_guards.contains_key(account_id) {
            // Accounts are never deleted, so absence here is stable.
            if !self.store.accounts.contains_key(account_id) {
                return Ok(None);
            }
            let guard = self
                .store
                .account_locks
                .acquire(account_id, self.store.config.lock_timeout)
                .await?;
            debug!(unit = self.id, account_id = %account_id, "account row locked");
            self.account_guards.insert(account_id.clone(), guard);
        }

        let staged = self.deltas.get(account_id).copied().unwrap_or_default();
        Ok(self.store.account(account_id).map(|mut account| {
            account.balance += staged;
            account
        }))
    }

    /// Lock a counter row exclusively and read its value
    ///
    /// A counter that does not exist yet is created with value 0 inside this
    /// unit of work.
    pub async fn lock_counter(&mut self, name: &str) -> Result<i64, StoreError> {
        self.store.ensure_available()?;

        if !self.counter_guards.contains_key(name) {
            let guard = self
                .store
                .counter_locks
                .acquire(&name.to_string(), self.store.config.lock_timeout)
                .await?;
            debug!(unit = self.id, counter = name, "counter row locked");
            self.counter_guards.insert(name.to_string(), guard);
        }

        let committed = self.store.counter(name);
        let value = *self
            .counters
            .entry(name.to_string())
            .or_insert_with(|| committed.unwrap_or(0));
        Ok(value)
    }

    /// Stage a new value for a locked counter
    pub fn set_counter(&mut self, name: &str, value: i64) -> Result<(), StoreError> {
        if !self.counter_guards.contains_key(name) {
            return Err(StoreError::NotLocked {
                row: self.store.counter_locks.row_name(&name.to_string()),
            });
        }
        self.counters.insert(name.to_string(), value);
        Ok(())
    }

    /// Stage a relative balance update on a locked account
    ///
    /// Applied at commit as `balance = balance + delta` against the committed
    /// row, never as an overwrite with a client-side copy.
    pub fn adjust_balance(
        &mut self,
        account_id: &AccountId,
        delta: Decimal,
    ) -> Result<(), StoreError> {
        self.ensure_account_locked(account_id)?;
        *self.deltas.entry(account_id.clone()).or_default() += delta;
        Ok(())
    }

    /// Stage a transaction record for a locked account
    pub fn append_record(
        &mut self,
        account_id: &AccountId,
        kind: EntryKind,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        self.ensure_account_locked(account_id)?;
        self.records.push(PendingRecord {
            account_id: account_id.clone(),
            kind,
            amount,
        });
        Ok(())
    }

    /// Stage a new account row
    ///
    /// Uniqueness is checked at commit.
    pub fn insert_account(&mut self, account: Account) {
        self.inserts.push(account);
    }

    /// Validate all constraints and apply every staged write
    ///
    /// # Errors
    ///
    /// * `StoreError::Unavailable` - The store was closed
    /// * `StoreError::LockTimeout` - The unique index was busy for too long
    /// * `StoreError::UniqueViolation` / `CheckViolation` - A constraint failed
    ///
    /// On error nothing is applied and the unit of work is rolled back.
    pub async fn commit(mut self) -> Result<(), StoreError> {
        let store = self.store;
        store.ensure_available()?;

        // Inserts hold the unique index from validation through apply, so two
        // concurrent registrants cannot both pass the uniqueness check.
        let _index_guard = if self.inserts.is_empty() {
            None
        } else {
            let timeout = store.config.lock_timeout;
            match tokio::time::timeout(timeout, store.unique_index.lock()).await {
                Ok(guard) => Some(guard),
                Err(_) => return Err(StoreError::lock_timeout("unique_index(accounts)", timeout)),
            }
        };

        self.validate()?;
        self.apply();
        self.finished = true;
        debug!(unit = self.id, "unit of work committed");
        Ok(())
    }

    /// Discard every staged write and release all locks
    pub fn rollback(self) {
        drop(self);
    }

    fn ensure_account_locked(&self, account_id: &AccountId) -> Result<(), StoreError> {
        if self.account_guards.contains_key(account_id) {
            Ok(())
        } else {
            Err(StoreError::NotLocked {
                row: self.store.account_locks.row_name(account_id),
            })
        }
    }

    fn validate(&self) -> Result<(), StoreError> {
        let store = self.store;

        for (index, account) in self.inserts.iter().enumerate() {
            let earlier = &self.inserts[..index];
            if store.accounts.contains_key(&account.account_id)
                || earlier.iter().any(|a| a.account_id == account.account_id)
            {
                return Err(StoreError::UniqueViolation {
                    constraint: ACCOUNTS_PKEY,
                });
            }
            if store.national_ids.contains_key(&account.national_id)
                || earlier.iter().any(|a| a.national_id == account.national_id)
            {
                return Err(StoreError::UniqueViolation {
                    constraint: ACCOUNTS_NATIONAL_ID_KEY,
                });
            }
            if store.phones.contains_key(&account.phone)
                || earlier.iter().any(|a| a.phone == account.phone)
            {
                return Err(StoreError::UniqueViolation {
                    constraint: ACCOUNTS_PHONE_KEY,
                });
            }
            if account.balance < Decimal::ZERO {
                return Err(StoreError::CheckViolation {
                    constraint: ACCOUNTS_BALANCE_CHECK,
                });
            }
        }

        let mut recorded: HashMap<&AccountId, Decimal> = HashMap::new();
        for record in &self.records {
            if record.amount <= Decimal::ZERO {
                return Err(StoreError::CheckViolation {
                    constraint: TRANSACTIONS_AMOUNT_CHECK,
                });
            }
            *recorded.entry(&record.account_id).or_default() += record.kind.signed(record.amount);
        }

        let paired = recorded
            .iter()
            .all(|(id, sum)| self.deltas.get(*id).copied().unwrap_or_default() == *sum)
            && self
                .deltas
                .iter()
                .all(|(id, delta)| recorded.get(id).copied().unwrap_or_default() == *delta);
        if !paired {
            return Err(StoreError::CheckViolation {
                constraint: LEDGER_ENTRIES_CHECK,
            });
        }

        for (account_id, delta) in &self.deltas {
            let committed = store
                .accounts
                .get(account_id)
                .map(|row| row.value().account.balance)
                .unwrap_or_default();
            match committed.checked_add(*delta) {
                Some(balance) if balance >= Decimal::ZERO => {}
                _ => {
                    return Err(StoreError::CheckViolation {
                        constraint: ACCOUNTS_BALANCE_CHECK,
                    })
                }
            }
        }

        for (name, value) in &self.counters {
            if store.counter(name).is_some_and(|committed| *value < committed) {
                return Err(StoreError::CheckViolation {
                    constraint: COUNTERS_VALUE_CHECK,
                });
            }
        }

        Ok(())
    }

    fn apply(&mut self) {
        let store = self.store;

        for account in self.inserts.drain(..) {
            store
                .national_ids
                .insert(account.national_id.clone(), account.account_id.clone());
            store
                .phones
                .insert(account.phone.clone(), account.account_id.clone());
            store.accounts.insert(
                account.account_id.clone(),
                AccountRow {
                    account,
                    history: Vec::new(),
                },
            );
        }

        let mut touched: Vec<AccountId> = self.deltas.keys().cloned().collect();
        for record in &self.records {
            if !touched.contains(&record.account_id) {
                touched.push(record.account_id.clone());
            }
        }

        let timestamp = Utc::now();
        for account_id in touched {
            let Some(mut row) = store.accounts.get_mut(&account_id) else {
                continue;
            };
            let row = row.value_mut();
            if let Some(delta) = self.deltas.get(&account_id) {
                row.account.balance += *delta;
            }
            for pending in self.records.iter().filter(|r| r.account_id == account_id) {
                row.history.push(TransactionRecord {
                    id: store.next_record_id.fetch_add(1, Ordering::SeqCst) + 1,
                    account_id: account_id.clone(),
                    amount: pending.amount,
                    kind: pending.kind,
                    timestamp,
                });
            }
        }

        for (name, value) in self.counters.drain() {
            store.counters.insert(name, value);
        }

        self.deltas.clear();
        self.records.clear();
    }
}

impl Drop for UnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                unit = self.id,
                discarded_inserts = self.inserts.len(),
                discarded_records = self.records.len(),
                "unit of work rolled back"
            );
        }
    }
}
