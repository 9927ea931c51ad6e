//! # Transition Port
//!
//! A transition is a named, pure function from a snapshot to a write patch,
//! plus a projection of the committed result.

use crate::domain::{Snapshot, SnapshotScope};
use ec_01_account_store::NextState;
use shared_types::{AccountState, DomainError};

/// One optimistic state transition.
///
/// `compute_next` may run several times per `attempt`, each time on a fresh
/// snapshot, so it must not have side effects. Returning a `DomainError`
/// ends the attempt without a write.
pub trait Transition: Send + Sync {
    /// Projected result of a successful commit.
    type Output: Send;

    /// Upper-case operation code, used in conflict errors (`<OP>_CONFLICT`).
    fn operation(&self) -> &str;

    /// Which fields the transition depends on.
    fn scope(&self) -> SnapshotScope {
        SnapshotScope::Full
    }

    /// Whether a blocked or banned account rejects this transition.
    /// Forced attempts skip the check either way.
    fn requires_active(&self) -> bool {
        true
    }

    /// Compute the fields to write.
    fn compute_next(&self, snapshot: &Snapshot) -> Result<NextState, DomainError>;

    /// Build the output from the snapshot the commit was based on and the
    /// document as written.
    fn project(&self, before: &Snapshot, committed: &AccountState, next: &NextState)
        -> Self::Output;
}
