//! # Service Container
//!
//! Builds every subsystem in dependency order and holds the services.
//!
//! ```text
//! Level 0: Account Store, Ledger Store (in-memory adapters)
//! Level 1: Audit Ledger, Transition Engine
//! Level 2: Rollback Coordinator
//! Level 3: Mutation Services (shared ServiceContext)
//! ```

use std::sync::Arc;
use std::time::Duration;

use ec_01_account_store::InMemoryAccountStore;
use ec_02_audit_ledger::{AuditLedger, InMemoryLedgerStore};
use ec_05_mutation_services::{
    ClaimService, CraftingService, CurrencyService, ItemService, PerkService, RollbackService,
    ServiceContext, StatusService, StoreService, TransferService,
};
use shared_types::{
    rate_limiter::presets, ActionRateLimiter, SlidingWindowLimiter, SystemTimeSource, TimeSource,
    UnlimitedRateLimiter,
};
use tracing::info;

use crate::container::config::EconomyConfig;
use crate::content::ContentPacks;

/// Concrete ledger type over the in-memory store.
pub type ConcreteAuditLedger = AuditLedger<Arc<InMemoryLedgerStore>>;

/// Central container holding the adapters and every service.
pub struct EconomyContainer {
    pub config: EconomyConfig,

    // =========================================================================
    // LEVEL 0: Adapters
    // =========================================================================
    pub account_store: Arc<InMemoryAccountStore>,
    pub ledger_store: Arc<InMemoryLedgerStore>,

    // =========================================================================
    // LEVEL 1-2: Core
    // =========================================================================
    pub ledger: Arc<ConcreteAuditLedger>,
    pub context: Arc<ServiceContext>,

    // =========================================================================
    // LEVEL 3: Services
    // =========================================================================
    pub currency: CurrencyService,
    pub transfers: TransferService,
    pub items: ItemService,
    pub crafting: CraftingService,
    pub store: StoreService,
    pub claims: ClaimService,
    pub perks: PerkService,
    pub status: StatusService,
    pub rollbacks: RollbackService,
}

impl EconomyContainer {
    /// Wire everything with the system clock.
    pub fn new(config: EconomyConfig, content: ContentPacks) -> Self {
        Self::with_clock(config, content, Arc::new(SystemTimeSource))
    }

    pub fn with_clock(
        config: EconomyConfig,
        content: ContentPacks,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let account_store = Arc::new(InMemoryAccountStore::new());
        let ledger_store = Arc::new(InMemoryLedgerStore::new());
        let ledger = Arc::new(AuditLedger::with_clock(
            Arc::clone(&ledger_store),
            Arc::clone(&clock),
        ));

        let limiter: Arc<dyn ActionRateLimiter> = if config.rate_limit.max_hits == 0 {
            Arc::new(UnlimitedRateLimiter)
        } else {
            Arc::new(SlidingWindowLimiter::new(
                config.rate_limit.max_hits,
                Duration::from_secs(config.rate_limit.window_secs),
            ))
        };

        let context = Arc::new(
            ServiceContext::new(account_store.clone(), ledger.clone())
                .with_limiter(limiter)
                .with_clock(clock)
                .with_settings(config.service_settings()),
        );

        let items = Arc::new(content.items);
        let recipes = Arc::new(content.recipes);
        let perks = Arc::new(content.perks);
        let store_catalog = Arc::new(content.store);

        let store = StoreService::new(Arc::clone(&context), Arc::clone(&items), store_catalog);
        let rollbacks = RollbackService::new(Arc::clone(&context))
            .with_items(Arc::clone(&items))
            .with_store(&store);
        let rollbacks = if config.rate_limit.max_hits == 0 {
            rollbacks
        } else {
            rollbacks.with_limiter(Arc::new(presets::rollbacks()))
        };

        info!(
            max_attempts = config.engine.max_attempts,
            rate_limit = config.rate_limit.max_hits,
            items = items.len(),
            "Economy container wired"
        );

        Self {
            currency: CurrencyService::new(Arc::clone(&context)),
            transfers: TransferService::new(Arc::clone(&context)),
            items: ItemService::new(Arc::clone(&context), Arc::clone(&items)),
            crafting: CraftingService::new(Arc::clone(&context), Arc::clone(&items), recipes),
            store,
            claims: ClaimService::new(Arc::clone(&context), config.claim_config()),
            perks: PerkService::new(Arc::clone(&context), perks),
            status: StatusService::new(Arc::clone(&context)),
            rollbacks,
            config,
            account_store,
            ledger_store,
            ledger,
            context,
        }
    }
}
