//! Core traits for identifier allocation
//!
//! This module defines the trait abstraction that lets the account registry
//! work with either the plain sequence allocator or the block-reserving one.

use crate::types::LedgerError;
use std::future::Future;

/// Trait for producing unique, strictly increasing integers per counter name
///
/// A value returned for `name` is never returned again by any allocator over
/// the same store, and is greater than every value this allocator returned
/// earlier for `name`, including under concurrent calls.
pub trait IdAllocator: Send + Sync {
    /// Allocate the next value of the named counter
    fn next(&self, name: &str) -> impl Future<Output = Result<i64, LedgerError>> + Send;
}
