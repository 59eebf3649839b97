//! Ledger Core Library
//! # Overview
//!
//! This library provides an account ledger: account registration with
//! collision-free ten-digit identifiers, deposits and withdrawals that never
//! overdraw, and balance queries, all safe under concurrent requests.
//!
//! # Architecture
//!
//! - [`types`] - Domain types (Account, TransactionRecord, requests, errors)
//! - [`store`] - Embedded transactional store with row locks and constraints
//! - [`core`] - Business logic components:
//!   - [`core::sequence`] - Counter-backed identifier allocation
//!   - [`core::registry`] - Account registration
//!   - [`core::engine`] - Deposits and withdrawals
//!   - [`core::balance`] - Balance and history reads
//!   - [`core::ledger`] - Facade dispatching typed requests
//! - [`io`] - CSV request parsing and account output
//! - [`strategy`] - Sequential and concurrent processing pipelines
//! - [`cli`] - CLI arguments and log setup
//!
//! # Operations
//!
//! - **Register**: Open an account with a zero balance; national id and phone
//!   must not be registered yet
//! - **Deposit**: Credit a positive amount to an account
//! - **Withdraw**: Debit a positive amount, only if the balance covers it
//! - **Balance**: Read the committed balance of an account
//!
//! Every balance change is committed together with exactly one transaction
//! record, so an account's balance always equals the sum of its signed records.

pub mod cli;
pub mod core;
pub mod io;
pub mod store;
pub mod strategy;
pub mod types;

pub use core::{Ledger, LedgerConfig};
pub use io::write_accounts_csv;
pub use store::{LedgerStore, StoreConfig, StoreError};
pub use types::{
    Account, AccountId, EntryKind, IdentityField, LedgerError, LedgerOutcome, LedgerRequest,
    TransactionRecord,
};
