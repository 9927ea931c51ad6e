//! # Snapshots
//!
//! Immutable view of an account handed to `Transition::compute_next`, and
//! the compare-and-swap precondition derived from it.

use ec_01_account_store::{Expectation, NextState};
use shared_types::{
    AccountState, AccountStatus, CurrencyId, CurrencyValue, InventorySlot, ItemId, UserId,
    Version,
};
use std::collections::BTreeMap;

/// Which part of the document a transition depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SnapshotScope {
    /// The whole document. Any concurrent write conflicts.
    #[default]
    Full,
    /// Only the listed entries (plus the status). Concurrent writes to
    /// other currencies or items do not conflict.
    Fields {
        currencies: Vec<CurrencyId>,
        items: Vec<ItemId>,
        cooldowns: Vec<String>,
    },
}

impl SnapshotScope {
    pub fn currencies(currencies: impl IntoIterator<Item = CurrencyId>) -> Self {
        Self::Fields {
            currencies: currencies.into_iter().collect(),
            items: Vec::new(),
            cooldowns: Vec::new(),
        }
    }

    pub fn items(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self::Fields {
            currencies: Vec::new(),
            items: items.into_iter().collect(),
            cooldowns: Vec::new(),
        }
    }
}

/// A fresh read of one account, valid for a single attempt.
#[derive(Debug, Clone)]
pub struct Snapshot {
    state: AccountState,
    scope: SnapshotScope,
    forced: bool,
}

impl Snapshot {
    pub fn new(state: AccountState, scope: SnapshotScope, forced: bool) -> Self {
        Self {
            state,
            scope,
            forced,
        }
    }

    pub fn state(&self) -> &AccountState {
        &self.state
    }

    pub fn user_id(&self) -> &UserId {
        &self.state.user_id
    }

    pub fn version(&self) -> Version {
        self.state.version
    }

    pub fn status(&self) -> AccountStatus {
        self.state.status
    }

    pub fn scope(&self) -> &SnapshotScope {
        &self.scope
    }

    /// True in forced (rollback/compensation) mode.
    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn balance(&self, currency: &CurrencyId) -> i64 {
        self.state.balance_of(currency)
    }

    /// Stored value, or an empty scalar when the currency is not held.
    pub fn currency_value(&self, currency: &CurrencyId) -> CurrencyValue {
        self.state
            .balances
            .get(currency)
            .cloned()
            .unwrap_or_default()
    }

    pub fn slot(&self, item: &ItemId) -> Option<&InventorySlot> {
        self.state.inventory.get(item)
    }

    pub fn quantity(&self, item: &ItemId) -> u64 {
        self.state.quantity_of(item)
    }

    pub fn cooldown(&self, kind: &str) -> Option<i64> {
        self.state.cooldowns.get(kind).copied()
    }

    /// Precondition for committing `next`.
    ///
    /// A field-scoped snapshot guards the listed fields plus every field
    /// `next` writes, each at the value it had in this snapshot.
    pub fn expectation_for(&self, next: &NextState) -> Expectation {
        let SnapshotScope::Fields {
            currencies,
            items,
            cooldowns,
        } = &self.scope
        else {
            return Expectation::Version(self.state.version);
        };

        let balances: BTreeMap<_, _> = currencies
            .iter()
            .chain(next.balances.keys())
            .map(|c| (c.clone(), self.state.balances.get(c).cloned()))
            .collect();
        let inventory: BTreeMap<_, _> = items
            .iter()
            .chain(next.inventory.keys())
            .map(|i| (i.clone(), self.state.inventory.get(i).cloned()))
            .collect();
        let cooldowns: BTreeMap<_, _> = cooldowns
            .iter()
            .chain(next.cooldowns.keys())
            .map(|k| (k.clone(), self.state.cooldowns.get(k).copied()))
            .collect();

        Expectation::Fields {
            balances,
            inventory,
            cooldowns,
            status: self.state.status,
        }
    }
}
