//! # Account Store Port
//!
//! Read-by-id and compare-and-swap write against one user document.

use crate::domain::{Expectation, NextState};
use async_trait::async_trait;
use shared_types::{AccountState, StorageError, UserId};
use std::sync::Arc;

/// Account State Store abstraction.
///
/// Both methods are suspension points and may fail with a `StorageError`
/// (including the client's own timeout); callers never retry those.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Read the current document.
    ///
    /// Ensure semantics: an unknown user yields (and persists) a fresh
    /// `ok` account at version 0.
    async fn read(&self, user_id: &UserId) -> Result<AccountState, StorageError>;

    /// Write `next` only if `expected` still holds.
    ///
    /// # Returns
    /// - `Ok(Some(state))`: committed; `state` is the new document with a
    ///   bumped version and fresh fingerprint
    /// - `Ok(None)`: precondition failed, another writer won the race
    /// - `Err`: storage failure
    async fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected: &Expectation,
        next: &NextState,
    ) -> Result<Option<AccountState>, StorageError>;

    /// Delete a document. Returns true if one existed.
    async fn remove(&self, user_id: &UserId) -> Result<bool, StorageError>;
}

#[async_trait]
impl<S: AccountStore + ?Sized> AccountStore for Arc<S> {
    async fn read(&self, user_id: &UserId) -> Result<AccountState, StorageError> {
        (**self).read(user_id).await
    }

    async fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected: &Expectation,
        next: &NextState,
    ) -> Result<Option<AccountState>, StorageError> {
        (**self).compare_and_swap(user_id, expected, next).await
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool, StorageError> {
        (**self).remove(user_id).await
    }
}
