//! # Outbound Ports
//!
//! Persistence the ledger depends on. Append and read only: there is no
//! update or delete.

use crate::domain::{AuditEntry, LedgerFilter, LedgerPage, Page};
use async_trait::async_trait;
use shared_types::StorageError;
use std::sync::Arc;

/// Append-only entry storage.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Next ordering sequence. Strictly increasing per store.
    fn next_sequence(&self) -> u64;

    /// Persist an entry and return it as stored.
    async fn insert(&self, entry: AuditEntry) -> Result<AuditEntry, StorageError>;

    /// Matching entries ordered by `(created_at, sequence)` ascending.
    async fn query(&self, filter: &LedgerFilter, page: Page) -> Result<LedgerPage, StorageError>;
}

#[async_trait]
impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    fn next_sequence(&self) -> u64 {
        (**self).next_sequence()
    }

    async fn insert(&self, entry: AuditEntry) -> Result<AuditEntry, StorageError> {
        (**self).insert(entry).await
    }

    async fn query(&self, filter: &LedgerFilter, page: Page) -> Result<LedgerPage, StorageError> {
        (**self).query(filter, page).await
    }
}
