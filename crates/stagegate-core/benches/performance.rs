// Rust guideline compliant 2026-10-14

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use stagegate_core::{
    expected_counts, CriteriaEvaluator, FileLimitStore, Gate, GateCatalog, GateTransitionEngine,
    Item, LimitStore, MemoryLimitStore, Pod, PromoteOptions, WipDefaults,
};
use std::sync::Arc;
use tempfile::TempDir;

fn build_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|i| {
            let mut item = Item::new(format!("Idea {}", i), "bench".to_string());
            item.pod = Some(Pod::ALL[i % Pod::ALL.len()]);
            item.gate = Gate::ACTIVE[i % Gate::ACTIVE.len()];
            item
        })
        .collect()
}

fn unlimited_defaults() -> WipDefaults {
    let mut defaults = WipDefaults::default();
    for limit in defaults
        .per_pod
        .values_mut()
        .chain(defaults.cross_pod.values_mut())
    {
        *limit = u32::MAX;
    }
    defaults.portfolio = u32::MAX;
    defaults
}

fn engine_over<S: LimitStore>(store: S) -> GateTransitionEngine<S> {
    GateTransitionEngine::new(
        Arc::new(GateCatalog::standard()),
        Arc::new(CriteriaEvaluator::standard()),
        Arc::new(store),
    )
    .expect("Failed to build engine")
}

fn bench_promote_memory(c: &mut Criterion) {
    let store = MemoryLimitStore::with_defaults(&unlimited_defaults()).expect("defaults");
    let engine = engine_over(store);
    let options = PromoteOptions {
        override_checks: true,
        comments: None,
    };
    let mut item = Item::new("Ping-pong".to_string(), "bench".to_string());
    item.pod = Some(Pod::Platform);
    engine.admit(&item).expect("admit");
    let mut seeded = item.clone();
    seeded.gate = Gate::Seed;

    // SPARK -> SEED -> SPARK keeps counters bounded across iterations
    c.bench_function("promote_round_trip_memory", |b| {
        b.iter(|| {
            black_box(engine.promote(&item, Gate::Seed, "bench", &options)).expect("forward");
            black_box(engine.promote(&seeded, Gate::Spark, "bench", &options)).expect("back");
        })
    });
}

fn bench_promote_file(c: &mut Criterion) {
    let options = PromoteOptions {
        override_checks: true,
        comments: None,
    };
    c.bench_function("promote_file_store", |b| {
        b.iter_batched(
            || {
                let temp_dir = TempDir::new().expect("Failed to create temp dir");
                let store = FileLimitStore::new(temp_dir.path().join("limits.jsonl"))
                    .expect("Failed to create store");
                store.initialize(&unlimited_defaults()).expect("initialize");
                let engine = engine_over(store);
                let mut item = Item::new("Bench".to_string(), "bench".to_string());
                item.pod = Some(Pod::Ratio);
                engine.admit(&item).expect("admit");
                (temp_dir, engine, item)
            },
            |(_temp_dir, engine, item)| {
                black_box(engine.promote(&item, Gate::Seed, "bench", &options))
                    .expect("Failed to promote");
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_validate_preview(c: &mut Criterion) {
    let engine = engine_over(
        MemoryLimitStore::with_defaults(&WipDefaults::default()).expect("defaults"),
    );
    let item = Item::new("Preview".to_string(), "bench".to_string());
    c.bench_function("preview_spark_to_seed", |b| {
        b.iter(|| black_box(engine.preview(&item, Gate::Seed, false)))
    });
}

fn bench_expected_counts(c: &mut Criterion) {
    let items = build_items(10_000);
    c.bench_function("expected_counts_10000", |b| {
        b.iter(|| black_box(expected_counts(&items)))
    });
}

criterion_group!(
    benches,
    bench_promote_memory,
    bench_promote_file,
    bench_validate_preview,
    bench_expected_counts
);
criterion_main!(benches);
