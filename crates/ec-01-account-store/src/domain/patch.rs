//! # Write Patches and Preconditions
//!
//! `NextState` is the set of fields a transition wants to write;
//! `Expectation` is the compare-and-swap precondition derived from what the
//! transition read.

use shared_types::{
    AccountState, AccountStatus, CurrencyId, CurrencyValue, InventorySlot, ItemId, Version,
};
use std::collections::BTreeMap;

/// Fields to write on a successful commit.
///
/// Only the listed keys are touched; everything else in the document is
/// carried over unchanged. An inventory entry of `None` (or an empty slot)
/// deletes the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NextState {
    pub balances: BTreeMap<CurrencyId, CurrencyValue>,
    pub inventory: BTreeMap<ItemId, Option<InventorySlot>>,
    pub cooldowns: BTreeMap<String, i64>,
    pub status: Option<AccountStatus>,
}

impl NextState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a balance.
    pub fn with_balance(mut self, currency: CurrencyId, value: CurrencyValue) -> Self {
        self.balances.insert(currency, value);
        self
    }

    /// Builder method to set or delete an inventory slot.
    pub fn with_slot(mut self, item: ItemId, slot: Option<InventorySlot>) -> Self {
        self.inventory.insert(item, slot);
        self
    }

    /// Builder method to stamp a cooldown.
    pub fn with_cooldown(mut self, kind: impl Into<String>, at_unix_secs: i64) -> Self {
        self.cooldowns.insert(kind.into(), at_unix_secs);
        self
    }

    /// Builder method to change the status.
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// True if committing this patch would change nothing but the version.
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
            && self.inventory.is_empty()
            && self.cooldowns.is_empty()
            && self.status.is_none()
    }

    /// Apply the patch to `current`, producing the next document.
    ///
    /// Version and fingerprint are left untouched; the store owns them.
    pub fn apply(&self, current: &AccountState) -> AccountState {
        let mut next = current.clone();

        for (currency, value) in &self.balances {
            next.balances.insert(currency.clone(), value.clone());
        }

        for (item, slot) in &self.inventory {
            match slot {
                Some(slot) if !slot.is_empty() => {
                    next.inventory.insert(item.clone(), slot.clone());
                }
                _ => {
                    next.inventory.remove(item);
                }
            }
        }

        for (kind, at) in &self.cooldowns {
            next.cooldowns.insert(kind.clone(), *at);
        }

        if let Some(status) = self.status {
            next.status = status;
        }

        next
    }
}

/// Compare-and-swap precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// The whole document is unchanged since it was read.
    Version(Version),
    /// Only the listed fields are unchanged since they were read.
    ///
    /// `None` means "absent when read". Concurrent writes to unlisted
    /// currencies or items do not invalidate the precondition.
    Fields {
        balances: BTreeMap<CurrencyId, Option<CurrencyValue>>,
        inventory: BTreeMap<ItemId, Option<InventorySlot>>,
        cooldowns: BTreeMap<String, Option<i64>>,
        status: AccountStatus,
    },
}

impl Expectation {
    /// Returns true if `current` still satisfies the precondition.
    pub fn holds(&self, current: &AccountState) -> bool {
        match self {
            Self::Version(version) => current.version == *version,
            Self::Fields {
                balances,
                inventory,
                cooldowns,
                status,
            } => {
                current.status == *status
                    && balances
                        .iter()
                        .all(|(currency, expected)| current.balances.get(currency) == expected.as_ref())
                    && inventory
                        .iter()
                        .all(|(item, expected)| current.inventory.get(item) == expected.as_ref())
                    && cooldowns
                        .iter()
                        .all(|(kind, expected)| current.cooldowns.get(kind) == expected.as_ref())
            }
        }
    }
}
