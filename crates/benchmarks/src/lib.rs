//! Benchmark utilities for the economy core subsystems
pub mod utils {
    use ec_01_account_store::InMemoryAccountStore;
    use rand::Rng;
    use shared_types::{AccountState, UserId};
    use std::sync::Arc;

    /// Store holding `users` accounts named `user-0..` with `balance` coins each.
    pub fn seeded_store(users: usize, balance: i64) -> Arc<InMemoryAccountStore> {
        let store = InMemoryAccountStore::new();
        for i in 0..users {
            // Fresh store, seeding cannot collide.
            let _ = store.seed(AccountState::new(user(i)).with_balance("coins", balance));
        }
        Arc::new(store)
    }

    pub fn user(i: usize) -> UserId {
        UserId::new(format!("user-{i}"))
    }

    /// Random non-zero credit in `1..=max`.
    pub fn random_delta(max: i64) -> i64 {
        rand::thread_rng().gen_range(1..=max)
    }

    pub fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap_or_else(|e| panic!("benchmark runtime: {e}"))
    }
}
