//! Explicit account status update.

use crate::domain::{MutationOutcome, Snapshot, SnapshotScope, StatusChange};
use crate::ports::Transition;
use ec_01_account_store::NextState;
use shared_types::{AccountState, AccountStatus, DomainError};

/// The only transition that changes `AccountStatus`. Runs regardless of the
/// current status so blocked accounts can be restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetStatus {
    pub status: AccountStatus,
}

impl SetStatus {
    pub fn new(status: AccountStatus) -> Self {
        Self { status }
    }
}

impl Transition for SetStatus {
    type Output = MutationOutcome;

    fn operation(&self) -> &str {
        "STATUS_UPDATE"
    }

    fn scope(&self) -> SnapshotScope {
        // Empty field scope: guards the status only.
        SnapshotScope::Fields {
            currencies: Vec::new(),
            items: Vec::new(),
            cooldowns: Vec::new(),
        }
    }

    fn requires_active(&self) -> bool {
        false
    }

    fn compute_next(&self, _snapshot: &Snapshot) -> Result<NextState, DomainError> {
        Ok(NextState::new().with_status(self.status))
    }

    fn project(&self, before: &Snapshot, committed: &AccountState, _next: &NextState) -> MutationOutcome {
        let mut outcome = MutationOutcome::new(committed);
        outcome.status = Some(StatusChange {
            before: before.status(),
            after: committed.status,
        });
        outcome
    }
}
