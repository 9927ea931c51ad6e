//! In-Memory Account Store
//!
//! Implements `AccountStore` over encoded documents held in a map.
//!
//! Every read decodes the stored bytes through `AccountCodec` and every
//! successful compare-and-swap re-encodes, so the adapter exercises the same
//! boundary a persistent backend would. The write lock is held only for the
//! duration of one compare-and-swap; the engine never holds it across a
//! compute step.

use crate::domain::{AccountCodec, Expectation, NextState};
use crate::ports::AccountStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{AccountState, StorageError, UserId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Operation counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub reads: u64,
    pub commits: u64,
    pub conflicts: u64,
}

/// In-memory document store.
pub struct InMemoryAccountStore {
    /// user id -> encoded document.
    documents: RwLock<HashMap<UserId, Vec<u8>>>,
    reads: AtomicU64,
    commits: AtomicU64,
    conflicts: AtomicU64,
}

impl InMemoryAccountStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            reads: AtomicU64::new(0),
            commits: AtomicU64::new(0),
            conflicts: AtomicU64::new(0),
        }
    }

    /// Seed a document for testing. Overwrites any existing document and
    /// keeps the seeded version.
    pub fn seed(&self, mut state: AccountState) -> Result<(), StorageError> {
        let bytes = AccountCodec::encode(&mut state)?;
        self.documents.write().insert(state.user_id.clone(), bytes);
        Ok(())
    }

    /// Overwrite the raw stored bytes of a document, bypassing the codec.
    pub fn put_raw(&self, user_id: UserId, bytes: Vec<u8>) {
        self.documents.write().insert(user_id, bytes);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            commits: self.commits.load(Ordering::Relaxed),
            conflicts: self.conflicts.load(Ordering::Relaxed),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn read(&self, user_id: &UserId) -> Result<AccountState, StorageError> {
        self.reads.fetch_add(1, Ordering::Relaxed);

        if let Some(bytes) = self.documents.read().get(user_id) {
            return AccountCodec::decode(user_id, bytes);
        }

        // Ensure: create lazily. Re-check under the write lock so two racing
        // first reads agree on one document.
        let mut documents = self.documents.write();
        if let Some(bytes) = documents.get(user_id) {
            return AccountCodec::decode(user_id, bytes);
        }

        let mut fresh = AccountState::new(user_id.clone());
        let bytes = AccountCodec::encode(&mut fresh)?;
        documents.insert(user_id.clone(), bytes);
        debug!(user_id = %user_id, "[ec-01] Created account document");
        Ok(fresh)
    }

    async fn compare_and_swap(
        &self,
        user_id: &UserId,
        expected: &Expectation,
        next: &NextState,
    ) -> Result<Option<AccountState>, StorageError> {
        let mut documents = self.documents.write();

        let current = match documents.get(user_id) {
            Some(bytes) => AccountCodec::decode(user_id, bytes)?,
            None => {
                // Removed since it was read.
                self.conflicts.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        };

        if !expected.holds(&current) {
            self.conflicts.fetch_add(1, Ordering::Relaxed);
            trace!(user_id = %user_id, version = %current.version, "[ec-01] CAS precondition failed");
            return Ok(None);
        }

        let mut updated = next.apply(&current);
        updated.version = current.version.next();
        let bytes = AccountCodec::encode(&mut updated)?;
        documents.insert(user_id.clone(), bytes);
        self.commits.fetch_add(1, Ordering::Relaxed);

        trace!(user_id = %user_id, version = %updated.version, "[ec-01] CAS committed");
        Ok(Some(updated))
    }

    async fn remove(&self, user_id: &UserId) -> Result<bool, StorageError> {
        Ok(self.documents.write().remove(user_id).is_some())
    }
}
