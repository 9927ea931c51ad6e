//! Engine error types.

use shared_types::{DomainError, StorageError};
use thiserror::Error;

/// Transition engine error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Business rule rejected the transition. Nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Every attempt lost its compare-and-swap race.
    #[error("{operation}_CONFLICT")]
    Conflict { operation: String, attempts: u32 },

    /// Account store failure. Not retried.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The business rejection, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            _ => None,
        }
    }
}
