//! Builders shared by the integration tests.

use ec_01_account_store::{AccountStore, FaultPlan, FaultyAccountStore, InMemoryAccountStore};
use ec_02_audit_ledger::{AuditLedger, InMemoryLedgerStore};
use ec_05_mutation_services::ServiceContext;
use economy_runtime::{ContentPacks, EconomyConfig, EconomyContainer};
use shared_types::{AccountState, ManualTimeSource, UserId};
use std::sync::Arc;

pub const EPOCH: i64 = 1_700_000_000;

/// Container with built-in content, no rate limit and a manual clock.
pub fn economy() -> EconomyContainer {
    economy_with(EconomyConfig::default())
}

pub fn economy_with(mut config: EconomyConfig) -> EconomyContainer {
    config.rate_limit.max_hits = 0;
    let content = ContentPacks::builtin().unwrap_or_else(|e| panic!("builtin content: {e}"));
    EconomyContainer::with_clock(config, content, Arc::new(ManualTimeSource::at_unix(EPOCH)))
}

/// Seed `user` with a coin balance.
pub fn seed_coins(economy: &EconomyContainer, user: &str, coins: i64) {
    economy
        .account_store
        .seed(AccountState::new(user.into()).with_balance("coins", coins))
        .unwrap_or_else(|e| panic!("seed {user}: {e}"));
}

pub async fn coins(economy: &EconomyContainer, user: &str) -> i64 {
    economy
        .account_store
        .read(&UserId::from(user))
        .await
        .map(|state| state.balance_of(&"coins".into()))
        .unwrap_or_else(|e| panic!("read {user}: {e}"))
}

/// Services over a fault-injecting store.
pub struct FaultyEconomy {
    pub accounts: Arc<InMemoryAccountStore>,
    pub store: Arc<FaultyAccountStore<Arc<InMemoryAccountStore>>>,
    pub ledger_store: Arc<InMemoryLedgerStore>,
    pub ctx: Arc<ServiceContext>,
}

impl FaultyEconomy {
    pub fn new(plan: FaultPlan) -> Self {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let store = Arc::new(FaultyAccountStore::with_plan(Arc::clone(&accounts), plan));
        let ledger_store = Arc::new(InMemoryLedgerStore::new());
        let ledger = Arc::new(AuditLedger::with_clock(
            Arc::clone(&ledger_store),
            Arc::new(ManualTimeSource::at_unix(EPOCH)),
        ));
        let ctx = Arc::new(ServiceContext::new(store.clone(), ledger));
        Self {
            accounts,
            store,
            ledger_store,
            ctx,
        }
    }

    pub fn seed_coins(&self, user: &str, coins: i64) {
        self.accounts
            .seed(AccountState::new(user.into()).with_balance("coins", coins))
            .unwrap_or_else(|e| panic!("seed {user}: {e}"));
    }
}
