//! Service error types.

use ec_02_audit_ledger::LedgerError;
use ec_03_transition_engine::{EngineError, MutationOutcome};
use ec_04_rollback::RollbackError;
use shared_types::{CorrelationId, DomainError, StorageError};
use std::time::Duration;
use thiserror::Error;

/// Content pack validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Invalid content id '{0}': must match ^[a-z0-9_]+$")]
    InvalidId(String),

    #[error("Duplicate content id '{0}'")]
    Duplicate(String),

    #[error("Invalid field {field} on '{id}': {reason}")]
    InvalidField {
        id: String,
        field: &'static str,
        reason: String,
    },

    /// A listing, recipe or perk references an item the catalog lacks.
    #[error("'{from}' references unknown item '{item}'")]
    UnknownReference { from: String, item: String },

    #[error("Unsupported schema version {0}")]
    SchemaVersion(u32),

    #[error("Malformed content pack: {0}")]
    Parse(String),
}

/// Mutation service error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Actor exceeded the per-action rate limit.
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Rollback(#[from] RollbackError),

    /// The mutation committed but its audit entries could not be written.
    #[error("Mutation {correlation_id} committed but audit write failed: {source}")]
    AuditWriteFailed {
        correlation_id: CorrelationId,
        outcomes: Vec<MutationOutcome>,
        source: LedgerError,
    },

    /// A transfer's second leg failed and re-crediting the first leg failed too.
    #[error("Transfer {correlation_id} compensation failed: {reason}")]
    CompensationFailed {
        correlation_id: CorrelationId,
        reason: String,
    },
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Engine(EngineError::Domain(err))
    }
}

impl ServiceError {
    /// The business rejection behind this error, if any.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Engine(e) => e.as_domain(),
            Self::Rollback(RollbackError::Engine(e)) => e.as_domain(),
            _ => None,
        }
    }

    /// Text safe to show the end user.
    pub fn user_message(&self) -> String {
        if let Some(domain) = self.as_domain() {
            return match domain {
                DomainError::InsufficientFunds {
                    currency, required, ..
                } => format!("You need {required} {currency} for that."),
                DomainError::InsufficientItems {
                    item,
                    required,
                    available,
                } => format!("You need {required} {item} but only have {available}."),
                DomainError::CapacityExceeded { item, max, .. } => {
                    format!("You can hold at most {max} {item}.")
                }
                DomainError::FeatureDisabled(what) => format!("{what} is currently disabled."),
                DomainError::AccountRestricted { .. } => {
                    "This account cannot perform economy actions.".to_string()
                }
                DomainError::SelfTransfer => "You cannot transfer to yourself.".to_string(),
                DomainError::InvalidAmount(_) => "That amount is not valid.".to_string(),
                DomainError::UnknownCurrency(c) => format!("Unknown currency: {c}."),
                DomainError::UnknownItem(i) => format!("Unknown item: {i}."),
                DomainError::OutOfStock { item, .. } => format!("{item} is out of stock."),
                DomainError::PurchaseLimitReached { item, limit } => {
                    format!("You can only buy {limit} {item}.")
                }
                DomainError::CooldownActive { remaining_secs, .. } => {
                    format!("Try again in {}.", humanize_secs(*remaining_secs))
                }
            };
        }

        match self {
            Self::RateLimited { retry_after } => format!(
                "Slow down! Try again in {}.",
                humanize_secs(retry_after.as_secs().max(1) as i64)
            ),
            Self::Engine(EngineError::Conflict { .. }) => {
                "The economy is busy right now, please try again.".to_string()
            }
            Self::Rollback(RollbackError::NotFound(_)) => "No such transaction.".to_string(),
            Self::Rollback(RollbackError::AlreadyRolledBack(_)) => {
                "That transaction was already rolled back.".to_string()
            }
            Self::Rollback(RollbackError::InProgress(_)) => {
                "That transaction is being rolled back already.".to_string()
            }
            _ => "Something went wrong, please contact an administrator.".to_string(),
        }
    }

    /// True when the store failed underneath the operation.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Self::Engine(EngineError::Storage(_)) | Self::Ledger(LedgerError::Storage(_))
        )
    }

    pub fn storage(&self) -> Option<&StorageError> {
        match self {
            Self::Engine(EngineError::Storage(e)) | Self::Ledger(LedgerError::Storage(e)) => {
                Some(e)
            }
            _ => None,
        }
    }
}

fn humanize_secs(secs: i64) -> String {
    let secs = secs.max(0);
    match secs {
        s if s >= 3_600 => format!("{}h {}m", s / 3_600, (s % 3_600) / 60),
        s if s >= 60 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{s}s"),
    }
}
