//! # EC-03 Transition Engine Brutal Benchmarks
//!
//! - Uncontended attempt: one read plus one CAS per call
//! - Hot account: N tasks crediting the same user, every loser retries
//! - Disjoint accounts: same N tasks spread over N users, no retries expected
//! - Batch width: cost of netting and guarding many keys in one CAS

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use ec_03_transition_engine::{AdjustCurrency, AttemptConfig, Batch, SlotRules, TransitionEngine};
use ec_benchmarks::utils::{random_delta, runtime, seeded_store, user};
use std::sync::Arc;
use std::time::Duration;

pub fn register_benchmarks(c: &mut Criterion) {
    brutal_uncontended(c);
    brutal_contention(c);
    brutal_batch_width(c);
}

pub fn brutal_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("ec-03/brutal/uncontended");
    let rt = runtime();
    let engine = TransitionEngine::new(seeded_store(1, 1_000_000));
    let target = user(0);

    group.throughput(Throughput::Elements(1));
    group.bench_function("credit", |b| {
        b.iter(|| {
            let transition = AdjustCurrency::named("GRANT", "coins", random_delta(100));
            rt.block_on(async {
                black_box(
                    engine
                        .attempt(&target, &transition, AttemptConfig::default())
                        .await
                        .is_ok(),
                )
            })
        })
    });

    // Rejected by a domain rule: read + compute, no write.
    group.bench_function("rejected_debit", |b| {
        let overdraft = AdjustCurrency::named("GRANT", "coins", -i64::MAX);
        b.iter(|| {
            rt.block_on(async {
                black_box(
                    engine
                        .attempt(&target, &overdraft, AttemptConfig::default())
                        .await
                        .is_err(),
                )
            })
        })
    });

    group.finish();
}

pub fn brutal_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("ec-03/brutal/contention");
    group.measurement_time(Duration::from_secs(15));
    let rt = runtime();

    for writers in [2usize, 8, 32] {
        group.throughput(Throughput::Elements(writers as u64));

        group.bench_with_input(BenchmarkId::new("hot_account", writers), &writers, |b, &n| {
            let engine = TransitionEngine::new(seeded_store(1, 0));
            b.iter(|| {
                rt.block_on(async {
                    let handles: Vec<_> = (0..n)
                        .map(|_| {
                            let engine = engine.clone();
                            tokio::spawn(async move {
                                engine
                                    .attempt(
                                        &user(0),
                                        &AdjustCurrency::named("GRANT", "coins", 1),
                                        AttemptConfig::default().with_max_attempts(n as u32 * 4),
                                    )
                                    .await
                                    .is_ok()
                            })
                        })
                        .collect();

                    let mut committed = 0;
                    for handle in handles {
                        if matches!(handle.await, Ok(true)) {
                            committed += 1;
                        }
                    }
                    black_box(committed)
                })
            })
        });

        group.bench_with_input(BenchmarkId::new("disjoint_accounts", writers), &writers, |b, &n| {
            let engine = TransitionEngine::new(seeded_store(n, 0));
            b.iter(|| {
                rt.block_on(async {
                    let handles: Vec<_> = (0..n)
                        .map(|i| {
                            let engine = engine.clone();
                            tokio::spawn(async move {
                                engine
                                    .attempt(
                                        &user(i),
                                        &AdjustCurrency::named("GRANT", "coins", 1),
                                        AttemptConfig::default(),
                                    )
                                    .await
                                    .is_ok()
                            })
                        })
                        .collect();

                    let mut committed = 0;
                    for handle in handles {
                        if matches!(handle.await, Ok(true)) {
                            committed += 1;
                        }
                    }
                    black_box(committed)
                })
            })
        });
    }

    group.finish();
}

pub fn brutal_batch_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("ec-03/brutal/batch_width");
    let rt = runtime();
    let store = seeded_store(1, 1_000_000);
    let engine = TransitionEngine::new(Arc::clone(&store));

    for width in [1usize, 8, 64] {
        let mut batch = Batch::new("CRAFT").currency("coins", -1);
        for i in 0..width {
            batch.push_item(format!("item_{i}").into(), 1, SlotRules::default());
        }

        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("items", width), &batch, |b, batch| {
            b.iter(|| {
                rt.block_on(async {
                    black_box(
                        engine
                            .attempt(&user(0), batch, AttemptConfig::forced())
                            .await
                            .is_ok(),
                    )
                })
            })
        });
    }

    group.finish();
}
