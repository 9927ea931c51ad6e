//! Single-key transitions.

use super::batch::Batch;
use crate::domain::{MutationOutcome, Snapshot, SnapshotScope, SlotRules};
use crate::ports::Transition;
use ec_01_account_store::NextState;
use shared_types::{AccountState, CurrencyId, DomainError, ItemId};

/// Add a signed amount to one currency's spendable balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustCurrency {
    currency: CurrencyId,
    delta: i64,
    inner: Batch,
}

impl AdjustCurrency {
    pub fn new(currency: impl Into<CurrencyId>, delta: i64) -> Self {
        Self::named("ADJUST_CURRENCY", currency, delta)
    }

    /// Same, reporting conflicts under `operation`.
    pub fn named(operation: impl Into<String>, currency: impl Into<CurrencyId>, delta: i64) -> Self {
        let currency = currency.into();
        Self {
            inner: Batch::new(operation).currency(currency.clone(), delta),
            currency,
            delta,
        }
    }

    pub fn currency_id(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }
}

impl Transition for AdjustCurrency {
    type Output = MutationOutcome;

    fn operation(&self) -> &str {
        self.inner.operation()
    }

    fn scope(&self) -> SnapshotScope {
        self.inner.scope()
    }

    fn compute_next(&self, snapshot: &Snapshot) -> Result<NextState, DomainError> {
        if self.delta == 0 {
            return Err(DomainError::InvalidAmount(0));
        }
        self.inner.compute_next(snapshot)
    }

    fn project(&self, before: &Snapshot, committed: &AccountState, next: &NextState) -> MutationOutcome {
        self.inner.project(before, committed, next)
    }
}

/// Add or remove items from one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustItem {
    item: ItemId,
    delta: i64,
    inner: Batch,
}

impl AdjustItem {
    pub fn new(item: impl Into<ItemId>, delta: i64) -> Self {
        Self::with_rules("ADJUST_ITEM", item, delta, SlotRules::default())
    }

    pub fn with_rules(
        operation: impl Into<String>,
        item: impl Into<ItemId>,
        delta: i64,
        rules: SlotRules,
    ) -> Self {
        let item = item.into();
        Self {
            inner: Batch::new(operation).item(item.clone(), delta, rules),
            item,
            delta,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item
    }

    pub fn delta(&self) -> i64 {
        self.delta
    }
}

impl Transition for AdjustItem {
    type Output = MutationOutcome;

    fn operation(&self) -> &str {
        self.inner.operation()
    }

    fn scope(&self) -> SnapshotScope {
        self.inner.scope()
    }

    fn compute_next(&self, snapshot: &Snapshot) -> Result<NextState, DomainError> {
        if self.delta == 0 {
            return Err(DomainError::InvalidAmount(0));
        }
        self.inner.compute_next(snapshot)
    }

    fn project(&self, before: &Snapshot, committed: &AccountState, next: &NextState) -> MutationOutcome {
        self.inner.project(before, committed, next)
    }
}
