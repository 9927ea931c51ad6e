//! # Audit Ledger Service
//!
//! Implements `AuditLedgerApi` over any `LedgerStore`.

use crate::domain::{
    AuditEntry, LedgerError, LedgerFilter, LedgerPage, NewAuditEntry, Page, MAX_PAGE_SIZE,
};
use crate::ports::{AuditLedgerApi, LedgerStore};
use async_trait::async_trait;
use shared_types::{CorrelationId, SystemTimeSource, TimeSource};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// The audit ledger.
pub struct AuditLedger<S> {
    store: S,
    clock: Arc<dyn TimeSource>,
}

impl<S: LedgerStore> AuditLedger<S> {
    /// Ledger stamping entries with the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemTimeSource))
    }

    pub fn with_clock(store: S, clock: Arc<dyn TimeSource>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drain every page of `filter`.
    async fn collect_all(&self, filter: LedgerFilter) -> Result<Vec<AuditEntry>, LedgerError> {
        let mut page = Page::first(MAX_PAGE_SIZE);
        let mut entries = Vec::new();
        loop {
            let result = self.store.query(&filter, page).await?;
            let last = result.is_last() || result.entries.is_empty();
            entries.extend(result.entries);
            if last {
                return Ok(entries);
            }
            page = page.next();
        }
    }
}

#[async_trait]
impl<S: LedgerStore> AuditLedgerApi for AuditLedger<S> {
    async fn create(&self, entry: NewAuditEntry) -> Result<AuditEntry, LedgerError> {
        entry.validate()?;

        let sequence = self.store.next_sequence();
        let entry = entry.into_entry(Uuid::new_v4(), self.clock.now(), sequence);

        match self.store.insert(entry.clone()).await {
            Ok(stored) => {
                debug!(
                    id = %stored.id,
                    operation = %stored.operation_type,
                    target = %stored.target_id,
                    "[ec-02] Audit entry created"
                );
                Ok(stored)
            }
            Err(e) => {
                error!(
                    error = %e,
                    entry = ?entry,
                    "[ec-02] Audit entry write failed"
                );
                Err(e.into())
            }
        }
    }

    async fn query(&self, filter: LedgerFilter, page: Page) -> Result<LedgerPage, LedgerError> {
        Ok(self.store.query(&filter, page).await?)
    }

    async fn find_by_correlation_key(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Vec<AuditEntry>, LedgerError> {
        self.collect_all(LedgerFilter::by_correlation(correlation_id.clone()))
            .await
    }

    async fn find_rollbacks_of(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Vec<AuditEntry>, LedgerError> {
        self.collect_all(LedgerFilter::rollbacks_of(correlation_id.clone()))
            .await
    }
}
