//! Crafting: consume recipe inputs and a currency cost, produce outputs,
//! all in one compare-and-swap on the crafter's document.

use super::{scaled, total_price};
use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{ItemCatalog, Receipt, RecipeBook, ServiceError};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::Batch;
use serde_json::json;
use shared_types::{CorrelationId, DomainError, GuildId, UserId};
use std::sync::Arc;

pub struct CraftingService {
    ctx: Arc<ServiceContext>,
    items: Arc<ItemCatalog>,
    recipes: Arc<RecipeBook>,
}

impl CraftingService {
    pub fn new(ctx: Arc<ServiceContext>, items: Arc<ItemCatalog>, recipes: Arc<RecipeBook>) -> Self {
        Self {
            ctx,
            items,
            recipes,
        }
    }

    /// Run `recipe_id` `times` times for `actor`.
    pub async fn craft(
        &self,
        actor: &UserId,
        guild: Option<GuildId>,
        recipe_id: &str,
        times: u32,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::Craft.as_str())?;
        if times == 0 {
            return Err(DomainError::InvalidAmount(0).into());
        }
        let recipe = self
            .recipes
            .get(recipe_id)
            .filter(|r| r.enabled)
            .ok_or_else(|| DomainError::FeatureDisabled(format!("Recipe {recipe_id}")))?;

        let mut batch = Batch::new("CRAFT");
        for input in &recipe.inputs {
            let rules = self.items.require(&input.item_id)?.rules();
            batch.push_item(input.item_id.clone(), -scaled(input.quantity, times)?, rules);
        }
        for output in &recipe.outputs {
            let rules = self.items.require(&output.item_id)?.rules();
            batch.push_item(output.item_id.clone(), scaled(output.quantity, times)?, rules);
        }
        if recipe.currency_cost > 0 {
            batch.push_currency(
                self.ctx.settings.primary_currency.clone(),
                -total_price(recipe.currency_cost, times.into())?,
            );
        }

        let outcome = self
            .ctx
            .engine
            .attempt(actor, &batch, self.ctx.attempts())
            .await?;

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(OperationType::Craft, actor, guild, &correlation_id)
            .entries_for(&outcome)
            .into_iter()
            .map(|entry| {
                entry
                    .meta("recipeId", json!(recipe.id))
                    .meta("times", json!(times))
            })
            .collect();
        self.ctx
            .record(OperationType::Craft, correlation_id, vec![outcome], entries)
            .await
    }
}
