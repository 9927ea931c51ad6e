//! Rate-limited entry point to the rollback coordinator.

use crate::context::ServiceContext;
use crate::domain::{ItemCatalog, ServiceError, StockLedger, StoreCatalog};
use crate::services::StoreService;
use ec_01_account_store::AccountStore;
use ec_02_audit_ledger::{AuditLedgerApi, OperationType};
use ec_04_rollback::{CorrelationGroupState, RollbackCoordinator, RollbackReport};
use shared_types::{ActionRateLimiter, CorrelationId, GuildId, UserId};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct RollbackService {
    ctx: Arc<ServiceContext>,
    coordinator: RollbackCoordinator<dyn AccountStore, dyn AuditLedgerApi>,
    limiter: Option<Arc<dyn ActionRateLimiter>>,
    store: Option<(Arc<StoreCatalog>, Arc<StockLedger>)>,
}

impl RollbackService {
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        let coordinator = RollbackCoordinator::new(ctx.engine.clone(), Arc::clone(&ctx.ledger));
        Self {
            ctx,
            coordinator,
            limiter: None,
            store: None,
        }
    }

    /// Gate rollbacks with their own limiter instead of the shared one.
    pub fn with_limiter(mut self, limiter: Arc<dyn ActionRateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Restore item slots in the shape the catalog defines.
    pub fn with_items(mut self, items: Arc<ItemCatalog>) -> Self {
        self.coordinator = self.coordinator.with_item_rules(items);
        self
    }

    /// Give stock and purchase counts back when a store group is rolled back.
    pub fn with_store(mut self, store: &StoreService) -> Self {
        self.store = Some((store.catalog(), store.stock_ledger()));
        self
    }

    pub async fn rollback(
        &self,
        actor: &UserId,
        guild: Option<GuildId>,
        correlation_id: &CorrelationId,
    ) -> Result<RollbackReport, ServiceError> {
        let limiter = self.limiter.as_deref().unwrap_or(&*self.ctx.limiter);
        ServiceContext::gate_with(limiter, actor, OperationType::Rollback.as_str())?;
        let report = self.coordinator.rollback(correlation_id, guild, actor).await?;
        self.unwind_stock(correlation_id).await;
        Ok(report)
    }

    pub async fn group_state(
        &self,
        correlation_id: &CorrelationId,
    ) -> Result<CorrelationGroupState, ServiceError> {
        Ok(self.coordinator.group_state(correlation_id).await?)
    }

    /// Runs once per group: only a complete rollback reaches it.
    async fn unwind_stock(&self, correlation_id: &CorrelationId) {
        let Some((catalog, stock)) = &self.store else {
            return;
        };
        let entries = match self.ctx.ledger.find_by_correlation_key(correlation_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(correlation_id = %correlation_id, error = %e, "[ec-05] Stock not unwound");
                return;
            }
        };

        for entry in &entries {
            let Some(item) = &entry.item_data else {
                continue;
            };
            let Some(listing) = catalog.get(&item.item_id) else {
                continue;
            };
            let quantity = item.applied_delta().unsigned_abs();
            match entry.operation_type {
                OperationType::StoreBuy => {
                    stock.unwind_purchase(listing, &entry.target_id, quantity)
                }
                OperationType::StoreSell => stock.unwind_sale(listing, quantity),
                _ => continue,
            }
            debug!(
                correlation_id = %correlation_id,
                item = %item.item_id,
                quantity,
                operation = entry.operation_type.as_str(),
                "[ec-05] Stock unwound"
            );
        }
    }
}
