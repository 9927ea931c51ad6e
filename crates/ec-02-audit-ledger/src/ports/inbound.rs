//! # Inbound Ports
//!
//! API trait defining what the Audit Ledger can do.

use crate::domain::{AuditEntry, LedgerError, LedgerFilter, LedgerPage, NewAuditEntry, Page};
use async_trait::async_trait;
use shared_types::CorrelationId;

/// Audit Ledger API - inbound port.
#[async_trait]
pub trait AuditLedgerApi: Send + Sync {
    /// Validate and persist a new entry.
    async fn create(&self, entry: NewAuditEntry) -> Result<AuditEntry, LedgerError>;

    /// Filtered, paginated, chronological query.
    async fn query(&self, filter: LedgerFilter, page: Page) -> Result<LedgerPage, LedgerError>;

    /// Every entry sharing a correlation id, chronological.
    async fn find_by_correlation_key(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Vec<AuditEntry>, LedgerError>;

    /// Rollback entries whose `originalCorrelationId` matches.
    async fn find_rollbacks_of(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<Vec<AuditEntry>, LedgerError>;
}
