//! # Store
//!
//! Buying takes a stock reservation first, then debits the price and
//! grants the items in one batch. A reservation whose batch does not
//! commit is released.

use super::{quantity_delta, total_price};
use crate::context::{EntryTemplate, ServiceContext};
use crate::domain::{ItemCatalog, Receipt, ServiceError, StockLedger, StoreCatalog, StoreListing};
use ec_02_audit_ledger::OperationType;
use ec_03_transition_engine::Batch;
use serde_json::json;
use shared_types::{CorrelationId, DomainError, GuildId, ItemId, UserId};
use std::sync::Arc;
use tracing::debug;

pub struct StoreService {
    ctx: Arc<ServiceContext>,
    items: Arc<ItemCatalog>,
    catalog: Arc<StoreCatalog>,
    stock: Arc<StockLedger>,
}

impl StoreService {
    pub fn new(ctx: Arc<ServiceContext>, items: Arc<ItemCatalog>, catalog: Arc<StoreCatalog>) -> Self {
        let stock = Arc::new(StockLedger::from_catalog(&catalog));
        Self {
            ctx,
            items,
            catalog,
            stock,
        }
    }

    pub fn stock(&self) -> &StockLedger {
        &self.stock
    }

    pub fn stock_ledger(&self) -> Arc<StockLedger> {
        Arc::clone(&self.stock)
    }

    pub fn catalog(&self) -> Arc<StoreCatalog> {
        Arc::clone(&self.catalog)
    }

    fn listing(&self, item: &ItemId) -> Result<&StoreListing, DomainError> {
        let listing = self
            .catalog
            .get(item)
            .ok_or_else(|| DomainError::UnknownItem(item.clone()))?;
        if !listing.available {
            return Err(DomainError::FeatureDisabled(format!("Store listing {item}")));
        }
        Ok(listing)
    }

    pub async fn buy(
        &self,
        actor: &UserId,
        guild: Option<GuildId>,
        item: &ItemId,
        quantity: u64,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::StoreBuy.as_str())?;
        let delta = quantity_delta(quantity)?;
        let listing = self.listing(item)?;
        let rules = self.items.require(item)?.rules();
        let price = total_price(listing.buy_price, quantity)?;

        let reservation = self.stock.reserve(listing, actor, quantity)?;
        let batch = Batch::new("STORE_BUY")
            .currency(self.ctx.settings.primary_currency.clone(), -price)
            .item(item.clone(), delta, rules);
        let outcome = match self.ctx.engine.attempt(actor, &batch, self.ctx.attempts()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(actor = %actor, item = %item, error = %e, "[ec-05] Purchase failed, releasing stock");
                self.stock.release(reservation);
                return Err(e.into());
            }
        };

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(OperationType::StoreBuy, actor, guild, &correlation_id)
            .entries_for(&outcome)
            .into_iter()
            .map(|entry| {
                entry
                    .meta("unitPrice", json!(listing.buy_price))
                    .meta("quantity", json!(quantity))
            })
            .collect();
        self.ctx
            .record(OperationType::StoreBuy, correlation_id, vec![outcome], entries)
            .await
    }

    pub async fn sell(
        &self,
        actor: &UserId,
        guild: Option<GuildId>,
        item: &ItemId,
        quantity: u64,
    ) -> Result<Receipt, ServiceError> {
        self.ctx.gate(actor, OperationType::StoreSell.as_str())?;
        let delta = quantity_delta(quantity)?;
        let listing = self.listing(item)?;
        if listing.sell_price == 0 {
            return Err(DomainError::FeatureDisabled(format!("Selling {item}")).into());
        }
        let rules = self.items.require(item)?.rules();
        let price = total_price(listing.sell_price, quantity)?;

        let batch = Batch::new("STORE_SELL")
            .item(item.clone(), -delta, rules)
            .currency(self.ctx.settings.primary_currency.clone(), price);
        let outcome = self
            .ctx
            .engine
            .attempt(actor, &batch, self.ctx.attempts())
            .await?;
        self.stock.restock(listing, quantity);

        let correlation_id = CorrelationId::generate();
        let entries = EntryTemplate::new(OperationType::StoreSell, actor, guild, &correlation_id)
            .entries_for(&outcome)
            .into_iter()
            .map(|entry| {
                entry
                    .meta("unitPrice", json!(listing.sell_price))
                    .meta("quantity", json!(quantity))
            })
            .collect();
        self.ctx
            .record(OperationType::StoreSell, correlation_id, vec![outcome], entries)
            .await
    }
}
