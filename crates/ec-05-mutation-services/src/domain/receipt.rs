//! What a committed service operation hands back.

use ec_02_audit_ledger::AuditEntry;
use ec_03_transition_engine::MutationOutcome;
use shared_types::{CorrelationId, CurrencyId, ItemId, UserId};

/// Committed outcomes plus the audit entries written for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub correlation_id: CorrelationId,
    pub outcomes: Vec<MutationOutcome>,
    pub entries: Vec<AuditEntry>,
}

impl Receipt {
    pub fn outcome_for(&self, user: &UserId) -> Option<&MutationOutcome> {
        self.outcomes.iter().find(|o| &o.user_id == user)
    }

    /// Balance of `currency` on `user` after the commit.
    pub fn balance_after(&self, user: &UserId, currency: &CurrencyId) -> Option<i64> {
        self.outcome_for(user)?.currency(currency).map(|c| c.after)
    }

    pub fn quantity_after(&self, user: &UserId, item: &ItemId) -> Option<u64> {
        self.outcome_for(user)?.item(item).map(|i| i.after)
    }
}
