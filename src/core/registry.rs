//! Account registration
//!
//! Registration runs in two steps that can each reject a duplicate registrant:
//!
//! 1. An unlocked advisory lookup of the national id and phone. It answers the
//!    common case cheaply, before an identifier is spent.
//! 2. The insert itself, checked against the store's uniqueness constraints
//!    at commit. A concurrent registrant that slipped past step 1 is rejected
//!    here.
//!
//! Both outcomes are reported as the same `LedgerError::DuplicateIdentity`.

use super::sequence::SequenceAllocator;
use super::traits::IdAllocator;
use crate::store::{
    LedgerStore, StoreError, ACCOUNTS_NATIONAL_ID_KEY, ACCOUNTS_PHONE_KEY,
};
use crate::types::{Account, AccountId, IdentityField, LedgerError};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counter used to mint account identifiers
pub const ACCOUNT_NUMBER_COUNTER: &str = "account_number";

/// Creates accounts with freshly minted identifiers
#[derive(Debug)]
pub struct AccountRegistry<A = SequenceAllocator> {
    store: Arc<LedgerStore>,
    allocator: A,
}

impl<A: IdAllocator> AccountRegistry<A> {
    pub fn new(store: Arc<LedgerStore>, allocator: A) -> Self {
        Self { store, allocator }
    }

    /// Register a new account with a zero balance
    ///
    /// # Returns
    ///
    /// * `Ok(AccountId)` - The ten-digit identifier of the new account
    /// * `Err(LedgerError::DuplicateIdentity)` - National id or phone already registered
    /// * `Err(LedgerError::AllocationFailed)` - No identifier could be minted
    /// * `Err(LedgerError::PersistenceFailure)` - The insert could not be committed
    pub async fn register(
        &self,
        name: &str,
        national_id: &str,
        phone: &str,
    ) -> Result<AccountId, LedgerError> {
        if let Some(field) = self.store.find_by_identity(national_id, phone) {
            warn!(%field, "registrant already exists");
            return Err(LedgerError::duplicate_identity(field));
        }

        let value = self.allocator.next(ACCOUNT_NUMBER_COUNTER).await?;
        let account_id = AccountId::from_sequence(value).ok_or_else(|| {
            error!(value, "sequence value does not fit an account identifier");
            LedgerError::allocation_failed(ACCOUNT_NUMBER_COUNTER, "ACCOUNT_ID_EXHAUSTED")
        })?;

        let failed = |e: StoreError| {
            error!(
                account_id = %account_id,
                code = e.code(),
                error = %e,
                "failed to insert account"
            );
            LedgerError::from(e)
        };

        let mut uow = self.store.begin().map_err(failed)?;
        uow.insert_account(Account::new(account_id.clone(), name, national_id, phone));

        match uow.commit().await {
            Ok(()) => {
                info!(account_id = %account_id, "account registered");
                Ok(account_id)
            }
            Err(StoreError::UniqueViolation { constraint }) => {
                let field = identity_field(constraint);
                warn!(%field, constraint, "registrant rejected by uniqueness constraint");
                Err(LedgerError::duplicate_identity(field))
            }
            Err(e) => Err(failed(e)),
        }
    }
}

fn identity_field(constraint: &str) -> IdentityField {
    match constraint {
        ACCOUNTS_NATIONAL_ID_KEY => IdentityField::NationalId,
        ACCOUNTS_PHONE_KEY => IdentityField::Phone,
        _ => IdentityField::AccountId,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    /// Allocator returning a fixed script of values
    struct ScriptedAllocator {
        next: AtomicI64,
    }

    impl IdAllocator for ScriptedAllocator {
        async fn next(&self, _name: &str) -> Result<i64, LedgerError> {
            Ok(self.next.fetch_add(1, Ordering::SeqCst))
        }
    }

    struct FailingAllocator;

    impl IdAllocator for FailingAllocator {
        async fn next(&self, name: &str) -> Result<i64, LedgerError> {
            Err(LedgerError::allocation_failed(name, "LOCK_TIMEOUT"))
        }
    }

    /// Allocator that commits a conflicting registrant before handing out
    /// its value, as a concurrent registration would
    struct SeedingAllocator {
        store: Arc<LedgerStore>,
        national_id: &'static str,
        phone: &'static str,
    }

    impl IdAllocator for SeedingAllocator {
        async fn next(&self, _name: &str) -> Result<i64, LedgerError> {
            let mut uow = self.store.begin()?;
            uow.insert_account(Account::new(
                AccountId::from("0000000099"),
                "Eve",
                self.national_id,
                self.phone,
            ));
            uow.commit().await?;
            Ok(1)
        }
    }

    fn registry() -> (Arc<LedgerStore>, AccountRegistry) {
        let store = Arc::new(LedgerStore::default());
        let allocator = SequenceAllocator::new(Arc::clone(&store));
        (Arc::clone(&store), AccountRegistry::new(store, allocator))
    }

    #[tokio::test]
    async fn test_register_mints_sequential_ten_digit_ids() {
        let (store, registry) = registry();

        let first = registry.register("Alice", "N1", "P1").await.unwrap();
        let second = registry.register("Bob", "N2", "P2").await.unwrap();

        assert_eq!(first.as_str(), "0000000001");
        assert_eq!(second.as_str(), "0000000002");
        assert_eq!(store.account(&first).unwrap().balance, Decimal::ZERO);
    }

    #[rstest::rstest]
    #[case::same_national_id("N1", "P2", IdentityField::NationalId)]
    #[case::same_phone("N2", "P1", IdentityField::Phone)]
    #[case::both("N1", "P1", IdentityField::NationalId)]
    #[tokio::test]
    async fn test_duplicate_rejected_before_allocation(
        #[case] national_id: &str,
        #[case] phone: &str,
        #[case] field: IdentityField,
    ) {
        let (store, registry) = registry();
        registry.register("Alice", "N1", "P1").await.unwrap();

        let result = registry.register("Mallory", national_id, phone).await;

        assert_eq!(result, Err(LedgerError::duplicate_identity(field)));
        // no identifier was spent on the rejected registrant
        assert_eq!(store.counter(ACCOUNT_NUMBER_COUNTER), Some(1));
    }

    #[tokio::test]
    async fn test_constraint_violation_maps_to_duplicate_identity() {
        let store = Arc::new(LedgerStore::default());
        // Both allocations yield 1, so the second insert collides on the key.
        let registry = AccountRegistry::new(
            Arc::clone(&store),
            ScriptedAllocator {
                next: AtomicI64::new(1),
            },
        );
        registry.register("Alice", "N1", "P1").await.unwrap();

        let colliding = AccountRegistry::new(
            Arc::clone(&store),
            ScriptedAllocator {
                next: AtomicI64::new(1),
            },
        );
        let result = colliding.register("Bob", "N2", "P2").await;

        assert_eq!(
            result,
            Err(LedgerError::duplicate_identity(IdentityField::AccountId))
        );
        assert_eq!(store.accounts().len(), 1);
    }

    #[rstest::rstest]
    #[case::national_id("N1", "P-OTHER", IdentityField::NationalId)]
    #[case::phone("N-OTHER", "P1", IdentityField::Phone)]
    #[tokio::test]
    async fn test_registrant_committed_after_lookup_is_rejected_at_commit(
        #[case] national_id: &'static str,
        #[case] phone: &'static str,
        #[case] field: IdentityField,
    ) {
        let store = Arc::new(LedgerStore::default());
        let registry = AccountRegistry::new(
            Arc::clone(&store),
            SeedingAllocator {
                store: Arc::clone(&store),
                national_id,
                phone,
            },
        );

        let result = registry.register("Bob", "N1", "P1").await;

        assert_eq!(result, Err(LedgerError::duplicate_identity(field)));
        let accounts = store.accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id.as_str(), "0000000099");
        assert!(store.account(&AccountId::from("0000000001")).is_none());
    }

    #[tokio::test]
    async fn test_allocation_failure_is_propagated() {
        let store = Arc::new(LedgerStore::default());
        let registry = AccountRegistry::new(Arc::clone(&store), FailingAllocator);

        let result = registry.register("Alice", "N1", "P1").await;

        assert_eq!(
            result,
            Err(LedgerError::allocation_failed(
                ACCOUNT_NUMBER_COUNTER,
                "LOCK_TIMEOUT"
            ))
        );
        assert!(store.accounts().is_empty());
    }

    #[tokio::test]
    async fn test_identifier_overflow_is_allocation_failure() {
        let store = Arc::new(LedgerStore::default());
        let registry = AccountRegistry::new(
            Arc::clone(&store),
            ScriptedAllocator {
                next: AtomicI64::new(10_000_000_000),
            },
        );

        let result = registry.register("Alice", "N1", "P1").await;

        assert_eq!(
            result,
            Err(LedgerError::allocation_failed(
                ACCOUNT_NUMBER_COUNTER,
                "ACCOUNT_ID_EXHAUSTED"
            ))
        );
    }

    #[tokio::test]
    async fn test_closed_store_is_persistence_failure() {
        let store = Arc::new(LedgerStore::new(StoreConfig::new(Duration::from_millis(20))));
        let registry = AccountRegistry::new(
            Arc::clone(&store),
            ScriptedAllocator {
                next: AtomicI64::new(1),
            },
        );
        store.close();

        let result = registry.register("Alice", "N1", "P1").await;

        assert_eq!(
            result,
            Err(LedgerError::PersistenceFailure {
                code: "STORE_UNAVAILABLE"
            })
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_duplicate_registrants_admit_exactly_one() {
        let (store, registry) = registry();
        let registry = Arc::new(registry);
        let mut handles = vec![];

        for i in 0..20 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry
                    .register(&format!("Twin {i}"), "N-SHARED", &format!("P{i}"))
                    .await
            }));
        }

        let mut registered = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => registered += 1,
                Err(e) => assert_eq!(
                    e,
                    LedgerError::duplicate_identity(IdentityField::NationalId)
                ),
            }
        }

        assert_eq!(registered, 1);
        assert_eq!(store.accounts().len(), 1);
    }
}
