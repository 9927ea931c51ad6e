//! Admin item grants and removals, checked against the item catalog.

use super::quantity_delta;
use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{ItemCatalog, Receipt, ServiceError};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::AdjustItem;
use serde_json::json;
use shared_types::{CorrelationId, GuildId, ItemId, UserId};
use std::sync::Arc;

pub struct ItemService {
    ctx: Arc<ServiceContext>,
    items: Arc<ItemCatalog>,
}

impl ItemService {
    pub fn new(ctx: Arc<ServiceContext>, items: Arc<ItemCatalog>) -> Self {
        Self { ctx, items }
    }

    pub async fn grant(
        &self,
        actor: &UserId,
        target: &UserId,
        guild: Option<GuildId>,
        item: &ItemId,
        quantity: u64,
    ) -> Result<Receipt, ServiceError> {
        let delta = quantity_delta(quantity)?;
        self.apply(actor, target, guild, item, delta, "ITEM_GRANT").await
    }

    pub async fn remove(
        &self,
        actor: &UserId,
        target: &UserId,
        guild: Option<GuildId>,
        item: &ItemId,
        quantity: u64,
    ) -> Result<Receipt, ServiceError> {
        let delta = quantity_delta(quantity)?;
        self.apply(actor, target, guild, item, -delta, "ITEM_REMOVE").await
    }

    async fn apply(
        &self,
        actor: &UserId,
        target: &UserId,
        guild: Option<GuildId>,
        item: &ItemId,
        delta: i64,
        operation: &'static str,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::Grant.as_str())?;
        let definition = self.items.require(item)?;

        let transition = AdjustItem::with_rules(operation, item.clone(), delta, definition.rules());
        let outcome = self
            .ctx
            .engine
            .attempt(target, &transition, self.ctx.attempts())
            .await?;

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(OperationType::Grant, actor, guild, &correlation_id)
            .entries_for(&outcome)
            .into_iter()
            .map(|entry| entry.meta("itemName", json!(definition.name)))
            .collect();
        self.ctx
            .record(OperationType::Grant, correlation_id, vec![outcome], entries)
            .await
    }
}
