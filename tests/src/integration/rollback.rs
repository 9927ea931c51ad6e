//! # Rollback Properties
//!
//! Reversal across services: crafting (items and coins in one group),
//! spent transfers driving the recipient into debt, the orphaned debit a
//! failed transfer compensation leaves behind, and partial rollbacks that
//! a later call completes.

#[cfg(test)]
mod tests {
    use crate::harness::{coins, economy, seed_coins, FaultyEconomy};
    use ec_01_account_store::{AccountStore, FaultPlan};
    use ec_02_audit_ledger::AuditLedgerApi;
    use ec_04_rollback::{CorrelationGroupState, RollbackError};
    use ec_05_mutation_services::{RollbackService, ServiceError, TransferService};
    use shared_types::{CorrelationId, UserId};

    fn admin() -> UserId {
        UserId::from("admin")
    }

    #[tokio::test]
    async fn test_craft_rollback_restores_inputs_and_cost() {
        let economy = economy();
        seed_coins(&economy, "alice", 100);
        economy
            .items
            .grant(&admin(), &"alice".into(), None, &"iron_ore".into(), 4)
            .await
            .unwrap();
        economy
            .items
            .grant(&admin(), &"alice".into(), None, &"coal".into(), 2)
            .await
            .unwrap();

        let receipt = economy
            .crafting
            .craft(&"alice".into(), None, "smelt_iron", 2)
            .await
            .unwrap();
        assert_eq!(receipt.quantity_after(&"alice".into(), &"iron_bar".into()), Some(2));
        assert_eq!(coins(&economy, "alice").await, 90);

        economy
            .rollbacks
            .rollback(&admin(), None, &receipt.correlation_id)
            .await
            .unwrap();

        let state = economy.account_store.read(&"alice".into()).await.unwrap();
        assert_eq!(state.quantity_of(&"iron_ore".into()), 4);
        assert_eq!(state.quantity_of(&"coal".into()), 2);
        assert_eq!(state.quantity_of(&"iron_bar".into()), 0);
        assert_eq!(state.balance_of(&"coins".into()), 100);
    }

    #[tokio::test]
    async fn test_rollback_of_spent_transfer_leaves_debt() {
        let economy = economy();
        seed_coins(&economy, "alice", 100);
        seed_coins(&economy, "bob", 50);
        seed_coins(&economy, "carol", 0);

        let first = economy
            .transfers
            .transfer(&"alice".into(), &"bob".into(), None, &"coins".into(), 30)
            .await
            .unwrap();
        economy
            .transfers
            .transfer(&"bob".into(), &"carol".into(), None, &"coins".into(), 80)
            .await
            .unwrap();

        economy
            .rollbacks
            .rollback(&admin(), None, &first.correlation_id)
            .await
            .unwrap();

        assert_eq!(coins(&economy, "alice").await, 100);
        assert_eq!(coins(&economy, "bob").await, -30);
        assert_eq!(coins(&economy, "carol").await, 80);
    }

    #[tokio::test]
    async fn test_unknown_group_is_not_found() {
        let economy = economy();
        let cid = CorrelationId::generate();

        assert_eq!(
            economy.rollbacks.group_state(&cid).await.unwrap(),
            CorrelationGroupState::Unknown
        );
        let err = economy.rollbacks.rollback(&admin(), None, &cid).await.unwrap_err();
        assert!(matches!(err, ServiceError::Rollback(RollbackError::NotFound(_))));
        assert!(economy.ledger_store.is_empty());
    }

    #[tokio::test]
    async fn test_orphaned_debit_can_be_rolled_back() {
        // First commit (the debit) lands, every later write fails.
        let fx = FaultyEconomy::new(FaultPlan {
            fail_cas_after: Some(1),
            ..FaultPlan::default()
        });
        fx.seed_coins("alice", 100);
        fx.seed_coins("bob", 0);
        let transfers = TransferService::new(fx.ctx.clone());
        let rollbacks = RollbackService::new(fx.ctx.clone());

        let err = transfers
            .transfer(&"alice".into(), &"bob".into(), None, &"coins".into(), 40)
            .await
            .unwrap_err();
        let cid = match err {
            ServiceError::CompensationFailed { correlation_id, .. } => correlation_id,
            other => panic!("unexpected {other:?}"),
        };

        let orphan = fx.ctx.ledger.find_by_correlation_key(&cid).await.unwrap();
        assert_eq!(orphan.len(), 1);
        assert_eq!(orphan[0].target_id, UserId::from("alice"));
        assert_eq!(orphan[0].reason, "transfer compensation failed");

        fx.store.heal();
        let report = rollbacks.rollback(&admin(), None, &cid).await.unwrap();
        assert_eq!(report.reversed_entries, 1);

        let alice = fx.accounts.read(&"alice".into()).await.unwrap();
        assert_eq!(alice.balance_of(&"coins".into()), 100);
        let bob = fx.accounts.read(&"bob".into()).await.unwrap();
        assert_eq!(bob.balance_of(&"coins".into()), 0);
    }

    #[tokio::test]
    async fn test_partial_rollback_is_completed_by_retry() {
        let fx = FaultyEconomy::new(FaultPlan::default());
        fx.seed_coins("alice", 100);
        fx.seed_coins("bob", 50);
        let transfers = TransferService::new(fx.ctx.clone());
        let rollbacks = RollbackService::new(fx.ctx.clone());

        let cid = transfers
            .transfer(&"alice".into(), &"bob".into(), None, &"coins".into(), 30)
            .await
            .unwrap()
            .correlation_id;

        fx.store.set_plan(FaultPlan {
            fail_cas_for: Some("bob".into()),
            ..FaultPlan::default()
        });
        let err = rollbacks.rollback(&admin(), None, &cid).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Rollback(RollbackError::Incomplete { reversed: 1, .. })
        ));
        assert_eq!(
            rollbacks.group_state(&cid).await.unwrap(),
            CorrelationGroupState::Open
        );

        fx.store.heal();
        let report = rollbacks.rollback(&admin(), None, &cid).await.unwrap();
        assert_eq!((report.reversed_entries, report.already_reversed), (1, 1));

        let alice = fx.accounts.read(&"alice".into()).await.unwrap();
        let bob = fx.accounts.read(&"bob".into()).await.unwrap();
        assert_eq!(alice.balance_of(&"coins".into()), 100);
        assert_eq!(bob.balance_of(&"coins".into()), 50);
        assert_eq!(
            rollbacks.group_state(&cid).await.unwrap(),
            CorrelationGroupState::RolledBack
        );
    }
}
