//! # Domain Module

pub mod errors;
pub mod plan;

pub use errors::RollbackError;
pub use plan::{InverseGroup, ItemRules, RollbackPlan, StackAll};

use shared_types::CorrelationId;
use uuid::Uuid;

/// Lifecycle of a correlation group: `Open -> RolledBack` (terminal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationGroupState {
    /// No entry carries the id.
    Unknown,
    /// Committed and not (completely) rolled back.
    Open,
    RolledBack,
}

/// Result of a completed rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackReport {
    pub correlation_id: CorrelationId,
    /// Entries reversed by this call.
    pub reversed_entries: usize,
    /// Entries an earlier partial rollback had already reversed.
    pub already_reversed: usize,
    pub rollback_entry_id: Uuid,
}
