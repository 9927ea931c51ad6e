//! # End-to-End Scenarios
//!
//! The canonical flows driven through the wired container:
//!
//! 1. Grant +50 on an existing balance
//! 2. Five concurrent +10 grants on one account
//! 3. Transfer 30 from A(100) to B(50)
//! 4. Roll that transfer back, then try again
//! 5. Debit of 100 from a balance of 10

#[cfg(test)]
mod tests {
    use crate::harness::{coins, economy, seed_coins};
    use ec_02_audit_ledger::{AuditLedgerApi, LedgerFilter, OperationType, Page};
    use ec_04_rollback::{CorrelationGroupState, RollbackError};
    use ec_05_mutation_services::ServiceError;
    use shared_types::{CurrencyId, DomainError, UserId};
    use std::sync::Arc;

    fn admin() -> UserId {
        UserId::from("admin")
    }

    // =========================================================================
    // SCENARIO 1: GRANT
    // =========================================================================

    #[tokio::test]
    async fn test_grant_credits_and_records_one_entry() {
        let economy = economy();
        seed_coins(&economy, "alice", 100);

        let receipt = economy
            .currency
            .adjust(&admin(), &"alice".into(), Some("g1".into()), &"coins".into(), 50, "event prize")
            .await
            .unwrap();

        assert_eq!(coins(&economy, "alice").await, 150);
        assert_eq!(receipt.entries.len(), 1);

        let entry = &receipt.entries[0];
        assert_eq!(entry.operation_type, OperationType::Grant);
        assert_eq!(entry.correlation_id(), Some(receipt.correlation_id.clone()));
        let currency = entry.currency_data.as_ref().unwrap();
        assert_eq!(
            (currency.before_balance, currency.after_balance, currency.delta),
            (100, 150, 50)
        );
        assert_eq!(entry.reason, "event prize");
    }

    // =========================================================================
    // SCENARIO 2: CONCURRENT GRANTS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_five_concurrent_grants_all_land() {
        let economy = Arc::new(economy());
        seed_coins(&economy, "alice", 0);

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let economy = Arc::clone(&economy);
                tokio::spawn(async move {
                    economy
                        .currency
                        .adjust(&admin(), &"alice".into(), None, &CurrencyId::from("coins"), 10, "")
                        .await
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let receipt = handle.await.unwrap().unwrap();
            ids.insert(receipt.correlation_id);
        }

        assert_eq!(coins(&economy, "alice").await, 50);
        assert_eq!(ids.len(), 5, "every grant gets its own correlation id");
        assert_eq!(economy.ledger_store.len(), 5);
    }

    // =========================================================================
    // SCENARIO 3: TRANSFER
    // =========================================================================

    #[tokio::test]
    async fn test_transfer_moves_funds_under_one_correlation() {
        let economy = economy();
        seed_coins(&economy, "alice", 100);
        seed_coins(&economy, "bob", 50);

        let receipt = economy
            .transfers
            .transfer(&"alice".into(), &"bob".into(), None, &"coins".into(), 30)
            .await
            .unwrap();

        assert_eq!(coins(&economy, "alice").await, 70);
        assert_eq!(coins(&economy, "bob").await, 80);

        let group = economy
            .ledger
            .find_by_correlation_key(&receipt.correlation_id)
            .await
            .unwrap();
        assert_eq!(group.len(), 2);
        let deltas: Vec<i64> = group
            .iter()
            .map(|e| e.currency_data.as_ref().unwrap().delta)
            .collect();
        assert_eq!(deltas, vec![-30, 30]);
        assert!(group.iter().all(|e| e.operation_type == OperationType::Transfer));
        assert!(group.iter().all(|e| e.actor_id == UserId::from("alice")));
    }

    // =========================================================================
    // SCENARIO 4: ROLLBACK
    // =========================================================================

    #[tokio::test]
    async fn test_transfer_rollback_restores_and_is_not_repeatable() {
        let economy = economy();
        seed_coins(&economy, "alice", 100);
        seed_coins(&economy, "bob", 50);

        let receipt = economy
            .transfers
            .transfer(&"alice".into(), &"bob".into(), None, &"coins".into(), 30)
            .await
            .unwrap();
        let cid = receipt.correlation_id;

        let report = economy.rollbacks.rollback(&admin(), None, &cid).await.unwrap();
        assert_eq!(report.reversed_entries, 2);
        assert_eq!(coins(&economy, "alice").await, 100);
        assert_eq!(coins(&economy, "bob").await, 50);
        assert_eq!(
            economy.rollbacks.group_state(&cid).await.unwrap(),
            CorrelationGroupState::RolledBack
        );

        let again = economy.rollbacks.rollback(&admin(), None, &cid).await;
        assert!(matches!(
            again,
            Err(ServiceError::Rollback(RollbackError::AlreadyRolledBack(ref id))) if *id == cid
        ));
        assert_eq!(coins(&economy, "alice").await, 100);

        let rollbacks = economy
            .ledger
            .query(
                LedgerFilter {
                    operation_type: Some(OperationType::Rollback),
                    ..LedgerFilter::default()
                },
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(rollbacks.entries.len(), 1);
        assert_eq!(rollbacks.entries[0].original_correlation_id(), Some(cid));
    }

    // =========================================================================
    // SCENARIO 5: REJECTED DEBIT
    // =========================================================================

    #[tokio::test]
    async fn test_overdraft_is_rejected_without_side_effects() {
        let economy = economy();
        seed_coins(&economy, "alice", 10);

        let err = economy
            .currency
            .adjust(&admin(), &"alice".into(), None, &"coins".into(), -100, "fine")
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InsufficientFunds {
                required: 100,
                available: 10,
                ..
            })
        ));
        assert_eq!(coins(&economy, "alice").await, 10);
        assert!(economy.ledger_store.is_empty());
        assert_eq!(economy.account_store.stats().commits, 0);
    }
}
