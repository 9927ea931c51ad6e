//! Perk purchases: a currency debit and a single perk item in one batch.
//! Owning the perk item is owning the perk, so a second purchase fails on
//! the item's capacity.

use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{PerkCatalog, Receipt, ServiceError};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::{Batch, SlotRules};
use serde_json::json;
use shared_types::{CorrelationId, DomainError, GuildId, UserId};
use std::sync::Arc;

const PERK_RULES: SlotRules = SlotRules {
    stackable: true,
    max_stack: Some(1),
};

pub struct PerkService {
    ctx: Arc<ServiceContext>,
    perks: Arc<PerkCatalog>,
}

impl PerkService {
    pub fn new(ctx: Arc<ServiceContext>, perks: Arc<PerkCatalog>) -> Self {
        Self { ctx, perks }
    }

    pub async fn purchase(
        &self,
        actor: &UserId,
        guild: Option<GuildId>,
        perk_id: &str,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::PerkPurchase.as_str())?;
        let perk = self
            .perks
            .get(perk_id)
            .filter(|p| p.enabled)
            .ok_or_else(|| DomainError::FeatureDisabled(format!("Perk {perk_id}")))?;

        let mut batch = Batch::new("PERK_PURCHASE").item(perk.item_id.clone(), 1, PERK_RULES);
        if perk.cost > 0 {
            batch.push_currency(self.ctx.settings.primary_currency.clone(), -perk.cost);
        }
        let outcome = self
            .ctx
            .engine
            .attempt(actor, &batch, self.ctx.attempts())
            .await?;

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(OperationType::PerkPurchase, actor, guild, &correlation_id)
            .entries_for(&outcome)
            .into_iter()
            .map(|entry| entry.meta("perkId", json!(perk.id)))
            .collect();
        self.ctx
            .record(OperationType::PerkPurchase, correlation_id, vec![outcome], entries)
            .await
    }
}
