//! Multi-delta transition on one account document.

use crate::domain::{
    adjust_balance, adjust_slot, CurrencyChange, ItemChange, MutationOutcome, Snapshot,
    SnapshotScope, SlotRules,
};
use crate::ports::Transition;
use ec_01_account_store::NextState;
use shared_types::{AccountState, CurrencyId, DomainError, ItemId};
use std::collections::BTreeMap;

/// A signed change to one inventory slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDelta {
    pub item: ItemId,
    pub delta: i64,
    pub rules: SlotRules,
}

/// Cooldown checked and stamped in the same commit as the payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownStamp {
    pub kind: String,
    pub period_secs: i64,
    pub now_secs: i64,
}

/// Several currency and item deltas applied to one document in one
/// compare-and-swap. Deltas on the same key are summed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    operation: String,
    currencies: Vec<(CurrencyId, i64)>,
    items: Vec<ItemDelta>,
    cooldown: Option<CooldownStamp>,
}

impl Batch {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            currencies: Vec::new(),
            items: Vec::new(),
            cooldown: None,
        }
    }

    pub fn currency(mut self, currency: impl Into<CurrencyId>, delta: i64) -> Self {
        self.currencies.push((currency.into(), delta));
        self
    }

    pub fn item(mut self, item: impl Into<ItemId>, delta: i64, rules: SlotRules) -> Self {
        self.items.push(ItemDelta {
            item: item.into(),
            delta,
            rules,
        });
        self
    }

    /// In-place form of `currency`.
    pub fn push_currency(&mut self, currency: CurrencyId, delta: i64) {
        self.currencies.push((currency, delta));
    }

    /// In-place form of `item`.
    pub fn push_item(&mut self, item: ItemId, delta: i64, rules: SlotRules) {
        self.items.push(ItemDelta { item, delta, rules });
    }

    pub fn items(&self) -> &[ItemDelta] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty() && self.items.is_empty() && self.cooldown.is_none()
    }

    pub fn cooldown(mut self, stamp: CooldownStamp) -> Self {
        self.cooldown = Some(stamp);
        self
    }

    fn net_currencies(&self) -> Result<BTreeMap<CurrencyId, i64>, DomainError> {
        let mut net: BTreeMap<CurrencyId, i64> = BTreeMap::new();
        for (currency, delta) in &self.currencies {
            let total = net.entry(currency.clone()).or_insert(0);
            *total = total
                .checked_add(*delta)
                .ok_or(DomainError::InvalidAmount(*delta))?;
        }
        net.retain(|_, delta| *delta != 0);
        Ok(net)
    }

    fn net_items(&self) -> Result<BTreeMap<ItemId, (i64, SlotRules)>, DomainError> {
        let mut net: BTreeMap<ItemId, (i64, SlotRules)> = BTreeMap::new();
        for delta in &self.items {
            let (total, _) = net.entry(delta.item.clone()).or_insert((0, delta.rules));
            *total = total
                .checked_add(delta.delta)
                .ok_or(DomainError::InvalidAmount(delta.delta))?;
        }
        net.retain(|_, (delta, _)| *delta != 0);
        Ok(net)
    }
}

impl Transition for Batch {
    type Output = MutationOutcome;

    fn operation(&self) -> &str {
        &self.operation
    }

    fn scope(&self) -> SnapshotScope {
        SnapshotScope::Fields {
            currencies: self.currencies.iter().map(|(c, _)| c.clone()).collect(),
            items: self.items.iter().map(|d| d.item.clone()).collect(),
            cooldowns: self.cooldown.iter().map(|c| c.kind.clone()).collect(),
        }
    }

    fn compute_next(&self, snapshot: &Snapshot) -> Result<NextState, DomainError> {
        let forced = snapshot.is_forced();
        let mut next = NextState::new();

        if let Some(stamp) = &self.cooldown {
            if let Some(last) = snapshot.cooldown(&stamp.kind) {
                let elapsed = stamp.now_secs.saturating_sub(last);
                if elapsed < stamp.period_secs {
                    return Err(DomainError::CooldownActive {
                        kind: stamp.kind.clone(),
                        remaining_secs: stamp.period_secs - elapsed,
                    });
                }
            }
            next = next.with_cooldown(stamp.kind.clone(), stamp.now_secs);
        }

        for (currency, delta) in self.net_currencies()? {
            let current = snapshot.currency_value(&currency);
            let balance = adjust_balance(&currency, current.spendable(), delta, forced)?;
            next = next.with_balance(currency, current.with_spendable(balance));
        }

        for (item, (delta, rules)) in self.net_items()? {
            let change = adjust_slot(&item, snapshot.slot(&item), delta, rules, forced)?;
            next = next.with_slot(item, change.slot);
        }

        if next.is_empty() {
            return Err(DomainError::InvalidAmount(0));
        }
        Ok(next)
    }

    fn project(&self, before: &Snapshot, committed: &AccountState, next: &NextState) -> MutationOutcome {
        let mut outcome = MutationOutcome::new(committed);

        outcome.currencies = next
            .balances
            .iter()
            .map(|(currency, value)| CurrencyChange {
                currency: currency.clone(),
                before: before.balance(currency),
                after: value.spendable(),
            })
            .collect();

        let requested = self.net_items().unwrap_or_default();
        outcome.items = next
            .inventory
            .keys()
            .map(|item| {
                let was = before.quantity(item);
                let now = committed.quantity_of(item);
                let shortfall = match requested.get(item) {
                    Some((delta, _)) if *delta < 0 => {
                        delta.unsigned_abs().saturating_sub(was.saturating_sub(now))
                    }
                    _ => 0,
                };
                ItemChange {
                    item: item.clone(),
                    before: was,
                    after: now,
                    shortfall,
                }
            })
            .collect();

        outcome.cooldowns = next
            .cooldowns
            .iter()
            .map(|(kind, at)| (kind.clone(), *at))
            .collect();

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AccountState, InventorySlot};

    fn snapshot(state: AccountState, forced: bool) -> Snapshot {
        Snapshot::new(state, SnapshotScope::Full, forced)
    }

    fn crafter() -> AccountState {
        AccountState::new("u1".into())
            .with_balance("coins", 100)
            .with_stack("iron_ore", 4)
            .with_stack("coal", 2)
    }

    #[test]
    fn test_craft_shaped_batch() {
        let batch = Batch::new("CRAFT")
            .item("iron_ore", -2, SlotRules::default())
            .item("coal", -1, SlotRules::default())
            .item("iron_bar", 1, SlotRules::default())
            .currency("coins", -10);

        let next = batch.compute_next(&snapshot(crafter(), false)).unwrap();
        assert_eq!(
            next.inventory.get(&ItemId::from("iron_bar")),
            Some(&Some(InventorySlot::Stack { quantity: 1 }))
        );
        assert_eq!(next.balances[&CurrencyId::from("coins")].spendable(), 90);
    }

    #[test]
    fn test_any_failing_leg_rejects_whole_batch() {
        let batch = Batch::new("CRAFT")
            .item("iron_ore", -2, SlotRules::default())
            .item("coal", -5, SlotRules::default());

        assert!(matches!(
            batch.compute_next(&snapshot(crafter(), false)),
            Err(DomainError::InsufficientItems { .. })
        ));
    }

    #[test]
    fn test_deltas_on_same_key_are_netted() {
        let batch = Batch::new("NET").currency("coins", -150).currency("coins", 60);
        let next = batch.compute_next(&snapshot(crafter(), false)).unwrap();
        assert_eq!(next.balances[&CurrencyId::from("coins")].spendable(), 10);
    }

    #[test]
    fn test_all_zero_is_invalid() {
        let batch = Batch::new("NOOP").currency("coins", 5).currency("coins", -5);
        assert_eq!(
            batch.compute_next(&snapshot(crafter(), false)),
            Err(DomainError::InvalidAmount(0))
        );
    }

    #[test]
    fn test_cooldown_active() {
        let mut state = crafter();
        state.cooldowns.insert("daily".into(), 1_000);
        let batch = Batch::new("DAILY_CLAIM")
            .currency("coins", 100)
            .cooldown(CooldownStamp {
                kind: "daily".into(),
                period_secs: 86_400,
                now_secs: 1_000 + 3_600,
            });

        assert_eq!(
            batch.compute_next(&snapshot(state, false)),
            Err(DomainError::CooldownActive {
                kind: "daily".into(),
                remaining_secs: 82_800
            })
        );
    }

    #[test]
    fn test_cooldown_elapsed_stamps_now() {
        let mut state = crafter();
        state.cooldowns.insert("work".into(), 0);
        let batch = Batch::new("WORK_CLAIM")
            .currency("coins", 25)
            .cooldown(CooldownStamp {
                kind: "work".into(),
                period_secs: 3_600,
                now_secs: 3_600,
            });

        let next = batch.compute_next(&snapshot(state, false)).unwrap();
        assert_eq!(next.cooldowns.get("work"), Some(&3_600));
    }

    #[test]
    fn test_project_reports_forced_shortfall() {
        let batch = Batch::new("ROLLBACK").item("coal", -5, SlotRules::default());
        let before = snapshot(crafter(), true);
        let next = batch.compute_next(&before).unwrap();
        let committed = next.apply(before.state());

        let outcome = batch.project(&before, &committed, &next);
        let coal = outcome.item(&"coal".into()).unwrap();
        assert_eq!((coal.before, coal.after, coal.shortfall), (2, 0, 3));
        assert_eq!(outcome.shortfall(), 3);
    }

    #[test]
    fn test_scope_lists_touched_keys() {
        let batch = Batch::new("X")
            .currency("coins", 1)
            .item("coal", 1, SlotRules::default());
        match batch.scope() {
            SnapshotScope::Fields {
                currencies, items, ..
            } => {
                assert_eq!(currencies, vec![CurrencyId::from("coins")]);
                assert_eq!(items, vec![ItemId::from("coal")]);
            }
            SnapshotScope::Full => panic!("expected field scope"),
        }
    }
}
