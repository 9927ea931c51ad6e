//! Committed mutation outcomes.
//!
//! Carry exactly the before/after values the services need to write audit
//! entries after a commit.

use shared_types::{AccountState, AccountStatus, CurrencyId, ItemId, UserId, Version};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyChange {
    pub currency: CurrencyId,
    pub before: i64,
    pub after: i64,
}

impl CurrencyChange {
    pub fn delta(&self) -> i64 {
        self.after.saturating_sub(self.before)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    pub item: ItemId,
    pub before: u64,
    pub after: u64,
    /// Requested removals that could not be applied (forced mode).
    pub shortfall: u64,
}

impl ItemChange {
    pub fn delta(&self) -> i64 {
        self.after as i64 - self.before as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub before: AccountStatus,
    pub after: AccountStatus,
}

/// What one committed transition did to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub user_id: UserId,
    /// Version written by the commit.
    pub version: Version,
    pub currencies: Vec<CurrencyChange>,
    pub items: Vec<ItemChange>,
    pub status: Option<StatusChange>,
    /// Cooldowns stamped by the commit.
    pub cooldowns: Vec<(String, i64)>,
}

impl MutationOutcome {
    pub fn new(state: &AccountState) -> Self {
        Self {
            user_id: state.user_id.clone(),
            version: state.version,
            currencies: Vec::new(),
            items: Vec::new(),
            status: None,
            cooldowns: Vec::new(),
        }
    }

    pub fn currency(&self, currency: &CurrencyId) -> Option<&CurrencyChange> {
        self.currencies.iter().find(|c| &c.currency == currency)
    }

    pub fn item(&self, item: &ItemId) -> Option<&ItemChange> {
        self.items.iter().find(|i| &i.item == item)
    }

    /// Sum of item shortfalls.
    pub fn shortfall(&self) -> u64 {
        self.items.iter().map(|i| i.shortfall).sum()
    }
}
