//! # EC-02 Audit Ledger Brutal Benchmarks
//!
//! - Append: validate, stamp and index one entry
//! - Correlation lookup: find a 2-entry group among 10k entries
//! - Rollback probe: the `originalCorrelationId` scan rollback runs first

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use ec_02_audit_ledger::{
    AuditLedger, AuditLedgerApi, CurrencyData, InMemoryLedgerStore, NewAuditEntry, OperationType,
};
use ec_benchmarks::utils::{random_delta, runtime, user};
use shared_types::CorrelationId;
use std::sync::Arc;

type Ledger = AuditLedger<Arc<InMemoryLedgerStore>>;

fn transfer_entries(correlation_id: &CorrelationId, from: usize, to: usize) -> [NewAuditEntry; 2] {
    let amount = random_delta(500);
    [
        NewAuditEntry::new(OperationType::Transfer, user(from), user(from))
            .correlation(correlation_id)
            .currency(CurrencyData::between("coins".into(), 1_000, 1_000 - amount)),
        NewAuditEntry::new(OperationType::Transfer, user(from), user(to))
            .correlation(correlation_id)
            .currency(CurrencyData::between("coins".into(), 0, amount)),
    ]
}

fn filled_ledger(rt: &tokio::runtime::Runtime, groups: usize) -> (Ledger, Vec<CorrelationId>) {
    let ledger = AuditLedger::new(Arc::new(InMemoryLedgerStore::new()));
    let mut ids = Vec::with_capacity(groups);
    rt.block_on(async {
        for i in 0..groups {
            let correlation_id = CorrelationId::generate();
            for entry in transfer_entries(&correlation_id, i % 97, (i + 1) % 97) {
                let _ = ledger.create(entry).await;
            }
            ids.push(correlation_id);
        }
    });
    (ledger, ids)
}

pub fn register_benchmarks(c: &mut Criterion) {
    brutal_append(c);
    brutal_lookup(c);
}

pub fn brutal_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("ec-02/brutal/append");
    let rt = runtime();
    let ledger = AuditLedger::new(Arc::new(InMemoryLedgerStore::new()));

    group.throughput(Throughput::Elements(2));
    group.bench_function("transfer_pair", |b| {
        b.iter(|| {
            let correlation_id = CorrelationId::generate();
            rt.block_on(async {
                let mut written = 0;
                for entry in transfer_entries(&correlation_id, 0, 1) {
                    if ledger.create(entry).await.is_ok() {
                        written += 1;
                    }
                }
                black_box(written)
            })
        })
    });

    group.finish();
}

pub fn brutal_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("ec-02/brutal/lookup");
    let rt = runtime();

    for groups in [1_000usize, 5_000] {
        let (ledger, ids) = filled_ledger(&rt, groups);
        let probe = ids[groups / 2].clone();

        group.bench_with_input(BenchmarkId::new("by_correlation", groups * 2), &probe, |b, id| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(ledger.find_by_correlation_key(id).await.map(|e| e.len()))
                })
            })
        });

        group.bench_with_input(BenchmarkId::new("rollbacks_of", groups * 2), &probe, |b, id| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(ledger.find_rollbacks_of(id).await.map(|e| e.len()))
                })
            })
        });
    }

    group.finish();
}
