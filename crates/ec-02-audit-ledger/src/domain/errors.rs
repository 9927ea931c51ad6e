//! Ledger error types.

use shared_types::StorageError;
use thiserror::Error;

/// Audit ledger error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger store failed. Fatal for the caller.
    #[error("Ledger storage error: {0}")]
    Storage(#[from] StorageError),

    /// The entry is internally inconsistent and was not written.
    #[error("Invalid audit entry: {0}")]
    InvalidEntry(String),
}
