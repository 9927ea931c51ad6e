//! Rollback error types.

use ec_02_audit_ledger::LedgerError;
use ec_03_transition_engine::EngineError;
use shared_types::CorrelationId;
use thiserror::Error;

/// Rollback coordinator error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollbackError {
    /// No audit entry carries this correlation id.
    #[error("No entries found for correlation id {0}")]
    NotFound(CorrelationId),

    /// A complete rollback entry already references this id.
    #[error("Correlation id {0} was already rolled back")]
    AlreadyRolledBack(CorrelationId),

    /// Another rollback of the same id is running in this process.
    #[error("Rollback of {0} is already in progress")]
    InProgress(CorrelationId),

    /// Some inverses were applied, then one failed. A partial rollback
    /// entry was written; retrying completes the job.
    #[error("Rollback of {correlation_id} incomplete after {reversed} entries: {reason}")]
    Incomplete {
        correlation_id: CorrelationId,
        reversed: usize,
        reason: String,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
