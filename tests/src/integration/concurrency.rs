//! # Concurrency Properties
//!
//! - N racing deltas on one account sum exactly
//! - A domain rejection writes neither state nor ledger
//! - Conflict exhaustion leaves the account untouched
//! - A competing write on a guarded key is seen by the retry

#[cfg(test)]
mod tests {
    use crate::harness::{coins, economy_with, seed_coins, FaultyEconomy};
    use ec_01_account_store::{AccountStore, FaultPlan, NextState};
    use ec_03_transition_engine::EngineError;
    use ec_05_mutation_services::{CurrencyService, ServiceError, TransferService};
    use economy_runtime::EconomyConfig;
    use rand::Rng;
    use shared_types::{CurrencyValue, DomainError, StorageError, UserId, Version};
    use std::sync::Arc;

    fn admin() -> UserId {
        UserId::from("admin")
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_deltas_sum_exactly() {
        let mut config = EconomyConfig::default();
        config.engine.max_attempts = 256;
        let economy = Arc::new(economy_with(config));
        seed_coins(&economy, "alice", 1_000);

        let deltas: Vec<i64> = {
            let mut rng = rand::thread_rng();
            (0..32).map(|_| rng.gen_range(-20..=20)).filter(|d| *d != 0).collect()
        };
        let expected: i64 = 1_000 + deltas.iter().sum::<i64>();

        let handles: Vec<_> = deltas
            .iter()
            .map(|&delta| {
                let economy = Arc::clone(&economy);
                tokio::spawn(async move {
                    economy
                        .currency
                        .adjust(&admin(), &"alice".into(), None, &"coins".into(), delta, "")
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(coins(&economy, "alice").await, expected);
        assert_eq!(economy.ledger_store.len(), deltas.len());

        let state = economy.account_store.read(&"alice".into()).await.unwrap();
        assert_eq!(state.version, Version(deltas.len() as u64));
    }

    #[tokio::test]
    async fn test_domain_rejection_writes_nothing() {
        let fx = FaultyEconomy::new(FaultPlan::default());
        fx.seed_coins("alice", 10);
        fx.seed_coins("bob", 0);
        let transfers = TransferService::new(fx.ctx.clone());

        let err = transfers
            .transfer(&"alice".into(), &"bob".into(), None, &"coins".into(), 11)
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InsufficientFunds { .. })
        ));
        assert!(fx.ledger_store.is_empty());
        assert_eq!(fx.accounts.stats().commits, 0);
        let bob = fx.accounts.read(&"bob".into()).await.unwrap();
        assert_eq!(bob.balance_of(&"coins".into()), 0);
    }

    #[tokio::test]
    async fn test_conflict_exhaustion_leaves_state_unchanged() {
        let fx = FaultyEconomy::new(FaultPlan {
            always_conflict: true,
            ..FaultPlan::default()
        });
        fx.seed_coins("alice", 100);
        let currency = CurrencyService::new(fx.ctx.clone());

        let err = currency
            .adjust(&admin(), &"alice".into(), None, &"coins".into(), 5, "")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Engine(EngineError::Conflict { attempts: 4, .. })
        ));
        assert_eq!(err.to_string(), "CURRENCY_ADJUST_CONFLICT");

        let state = fx.accounts.read(&"alice".into()).await.unwrap();
        assert_eq!(state.balance_of(&"coins".into()), 100);
        assert_eq!(state.version, Version(0));
        assert!(fx.ledger_store.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_retried() {
        let fx = FaultyEconomy::new(FaultPlan {
            fail_reads_for: Some("alice".into()),
            ..FaultPlan::default()
        });
        let currency = CurrencyService::new(fx.ctx.clone());

        let err = currency
            .adjust(&admin(), &"alice".into(), None, &"coins".into(), 5, "")
            .await
            .unwrap_err();

        assert!(err.is_storage());
        assert!(matches!(err.storage(), Some(StorageError::Unavailable(_))));
        assert_eq!(fx.accounts.stats().reads, 0);
    }

    #[tokio::test]
    async fn test_competing_write_is_seen_by_retry() {
        let fx = FaultyEconomy::new(FaultPlan {
            interfering_writes: 1,
            interference: NextState::new()
                .with_balance("coins".into(), CurrencyValue::Scalar { amount: 500 }),
            ..FaultPlan::default()
        });
        fx.seed_coins("alice", 100);
        let currency = CurrencyService::new(fx.ctx.clone());

        let receipt = currency
            .adjust(&admin(), &"alice".into(), None, &"coins".into(), 10, "")
            .await
            .unwrap();

        // The first CAS lost to the competing write; the retry credited 500.
        assert_eq!(receipt.balance_after(&"alice".into(), &"coins".into()), Some(510));
        let entry = receipt.entries[0].currency_data.as_ref().unwrap();
        assert_eq!((entry.before_balance, entry.after_balance), (500, 510));
        assert_eq!(fx.accounts.stats().conflicts, 1);
    }
}
