//! # Inverse Planning
//!
//! Turns a correlation group into one forced `Batch` per affected account.

use ec_02_audit_ledger::{AuditEntry, OperationType};
use ec_03_transition_engine::{Batch, SlotRules};
use shared_types::{CurrencyId, ItemId, UserId};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// How a restored item slot is created when the account no longer holds it.
pub trait ItemRules: Send + Sync {
    fn slot_rules(&self, item: &ItemId) -> SlotRules;
}

/// Restores every item as a stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackAll;

impl ItemRules for StackAll {
    fn slot_rules(&self, _item: &ItemId) -> SlotRules {
        SlotRules::default()
    }
}

/// Inverses for one account, replayed in a single commit.
#[derive(Debug, Clone)]
pub struct InverseGroup {
    pub target: UserId,
    /// Original entries this group reverses, chronological.
    pub entry_ids: Vec<Uuid>,
    pub batch: Batch,
    /// Non-zero netted inverse deltas in `batch`.
    pub legs: usize,
}

/// Everything left to reverse for one correlation id.
#[derive(Debug, Clone, Default)]
pub struct RollbackPlan {
    /// Groups in order of each account's first appearance.
    pub groups: Vec<InverseGroup>,
    /// Entries an earlier partial rollback already reversed.
    pub already_reversed: usize,
    /// Entries with no currency or item data; nothing to undo.
    pub skipped: Vec<Uuid>,
}

struct Pending {
    target: UserId,
    entry_ids: Vec<Uuid>,
    currencies: BTreeMap<CurrencyId, i64>,
    items: BTreeMap<ItemId, i64>,
}

impl Pending {
    fn into_group(self, rules: &dyn ItemRules) -> InverseGroup {
        let mut batch = Batch::new("ROLLBACK");
        let mut legs = 0;
        for (currency, delta) in self.currencies.into_iter().filter(|(_, d)| *d != 0) {
            batch.push_currency(currency, delta);
            legs += 1;
        }
        for (item, delta) in self.items.into_iter().filter(|(_, d)| *d != 0) {
            // Restores are forced; capacity limits never block them.
            let slot = SlotRules {
                max_stack: None,
                ..rules.slot_rules(&item)
            };
            batch.push_item(item, delta, slot);
            legs += 1;
        }
        InverseGroup {
            target: self.target,
            entry_ids: self.entry_ids,
            batch,
            legs,
        }
    }
}

impl RollbackPlan {
    /// Build the plan from chronological `entries`.
    ///
    /// Inverses are netted per key within each account, so a group whose
    /// entries cancel out ends with zero legs and needs no commit.
    pub fn build(
        entries: &[AuditEntry],
        reversed: &HashSet<Uuid>,
        rules: &dyn ItemRules,
    ) -> Self {
        let mut plan = Self::default();
        let mut pending: Vec<Pending> = Vec::new();

        for entry in entries {
            if entry.operation_type == OperationType::Rollback {
                continue;
            }
            if reversed.contains(&entry.id) {
                plan.already_reversed += 1;
                continue;
            }
            if entry.currency_data.is_none() && entry.item_data.is_none() {
                plan.skipped.push(entry.id);
                continue;
            }

            let index = match pending.iter().position(|g| g.target == entry.target_id) {
                Some(index) => index,
                None => {
                    pending.push(Pending {
                        target: entry.target_id.clone(),
                        entry_ids: Vec::new(),
                        currencies: BTreeMap::new(),
                        items: BTreeMap::new(),
                    });
                    pending.len() - 1
                }
            };
            let group = &mut pending[index];
            group.entry_ids.push(entry.id);

            if let Some(currency) = &entry.currency_data {
                let inverse = currency
                    .before_balance
                    .saturating_sub(currency.after_balance);
                let net = group.currencies.entry(currency.currency_id.clone()).or_insert(0);
                *net = net.saturating_add(inverse);
            }

            if let Some(item) = &entry.item_data {
                let inverse = item.applied_delta().saturating_neg();
                let net = group.items.entry(item.item_id.clone()).or_insert(0);
                *net = net.saturating_add(inverse);
            }
        }

        plan.groups = pending.into_iter().map(|g| g.into_group(rules)).collect();
        plan
    }

    /// Entries this plan would reverse.
    pub fn pending(&self) -> usize {
        self.groups.iter().map(|g| g.entry_ids.len()).sum()
    }
}
