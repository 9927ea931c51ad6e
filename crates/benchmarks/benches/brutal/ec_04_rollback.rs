//! # EC-04 Rollback Brutal Benchmarks
//!
//! Each iteration commits a fresh transfer-shaped group (debit + credit,
//! two entries) and rolls it back: group lookup, reversal check, two forced
//! batches and the rollback entry.

use criterion::{black_box, BatchSize, Criterion};
use ec_01_account_store::InMemoryAccountStore;
use ec_02_audit_ledger::{
    AuditLedger, AuditLedgerApi, CurrencyData, InMemoryLedgerStore, NewAuditEntry, OperationType,
};
use ec_03_transition_engine::{AdjustCurrency, AttemptConfig, TransitionEngine};
use ec_04_rollback::RollbackCoordinator;
use ec_benchmarks::utils::{runtime, seeded_store, user};
use shared_types::{CorrelationId, UserId};
use std::sync::Arc;

type Ledger = AuditLedger<Arc<InMemoryLedgerStore>>;

async fn commit_transfer(
    engine: &TransitionEngine<InMemoryAccountStore>,
    ledger: &Ledger,
    amount: i64,
) -> CorrelationId {
    let correlation_id = CorrelationId::generate();
    let legs = [(user(0), -amount), (user(1), amount)];
    for (target, delta) in legs {
        let outcome = engine
            .attempt(
                &target,
                &AdjustCurrency::named("TRANSFER", "coins", delta),
                AttemptConfig::forced(),
            )
            .await;
        if let Ok(outcome) = outcome {
            if let Some(change) = outcome.currency(&"coins".into()) {
                let _ = ledger
                    .create(
                        NewAuditEntry::new(OperationType::Transfer, user(0), target.clone())
                            .correlation(&correlation_id)
                            .currency(CurrencyData::between(
                                "coins".into(),
                                change.before,
                                change.after,
                            )),
                    )
                    .await;
            }
        }
    }
    correlation_id
}

pub fn register_benchmarks(c: &mut Criterion) {
    brutal_rollback(c);
}

pub fn brutal_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("ec-04/brutal/rollback");
    let rt = runtime();
    let engine = TransitionEngine::new(seeded_store(2, 1_000_000));
    let ledger = Arc::new(AuditLedger::new(Arc::new(InMemoryLedgerStore::new())));
    let coordinator = RollbackCoordinator::new(engine.clone(), Arc::clone(&ledger));
    let admin = UserId::from("admin");

    group.bench_function("transfer_group", |b| {
        b.iter_batched(
            || rt.block_on(commit_transfer(&engine, &ledger, 30)),
            |correlation_id| {
                rt.block_on(async {
                    black_box(coordinator.rollback(&correlation_id, None, &admin).await.is_ok())
                })
            },
            BatchSize::SmallInput,
        )
    });

    // Second rollback of the same group: lookup plus reversal check only.
    let reversed = rt.block_on(async {
        let id = commit_transfer(&engine, &ledger, 30).await;
        let _ = coordinator.rollback(&id, None, &admin).await;
        id
    });
    group.bench_function("already_rolled_back", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(coordinator.rollback(&reversed, None, &admin).await.is_err())
            })
        })
    });

    group.finish();
}
