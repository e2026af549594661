// Rust guideline compliant 2026-10-14

//! End-to-end tests for the transition engine.
//!
//! These tests drive promotions through the engine and check both the
//! returned values and the counters left behind.

use stagegate_core::{
    CriteriaEvaluator, FailureKind, Gate, GateCatalog, GateTransitionEngine, Item, LimitStore,
    MemoryLimitStore, Outcome, Pod, PromoteOptions, PromotionOutcome, Scope, WipDefaults,
};
use std::sync::Arc;

fn engine() -> GateTransitionEngine<MemoryLimitStore> {
    let store = MemoryLimitStore::with_defaults(&WipDefaults::default()).expect("defaults");
    GateTransitionEngine::new(
        Arc::new(GateCatalog::standard()),
        Arc::new(CriteriaEvaluator::standard()),
        Arc::new(store),
    )
    .expect("engine")
}

fn current(engine: &GateTransitionEngine<MemoryLimitStore>, scope: Scope) -> u32 {
    engine
        .wip()
        .store()
        .get(&scope)
        .expect("store read")
        .expect("initialized scope")
        .current
}

fn per_pod(gate: Gate) -> Scope {
    Scope::PerPod {
        pod: Pod::Platform,
        gate,
    }
}

/// A SPARK item on PLATFORM meeting every SEED entry and SPARK exit criterion.
fn spark_item_ready_for_seed() -> Item {
    let mut item = Item::new("Incident timeline export".to_string(), "ines".to_string());
    item.pod = Some(Pod::Platform);
    item.set_fact("problem_statement", "Postmortems take days to assemble");
    item.set_fact("hypothesis", "Exporting timelines halves postmortem time");
    item.set_fact("idea_ledger_entry", true);
    item.set_fact("strategic_fit", 4);
    item.set_fact("impact", 5);
    item.set_fact("feasibility_check_completed", true);
    item.set_fact("spark_gate_passed", true);
    item.set_fact("owner", "ines");
    item
}

/// Puts `count` other items into `gate` for PLATFORM.
fn occupy(engine: &GateTransitionEngine<MemoryLimitStore>, gate: Gate, count: usize) {
    for i in 0..count {
        let mut filler = Item::new(format!("Filler {}", i), "ines".to_string());
        filler.pod = Some(Pod::Platform);
        filler.gate = gate;
        assert!(engine.admit(&filler).expect("admit").ok);
    }
}

#[test]
fn test_full_per_pod_scope_rejects_promotion() {
    let engine = engine();
    let item = spark_item_ready_for_seed();
    assert!(engine.admit(&item).expect("admit").ok);
    occupy(&engine, Gate::Seed, 5);
    assert_eq!(current(&engine, per_pod(Gate::Seed)), 5);

    let outcome = engine
        .promote(&item, Gate::Seed, "lead", &PromoteOptions::default())
        .expect("promote");

    let PromotionOutcome::Rejected(rejection) = outcome else {
        panic!("expected capacity rejection");
    };
    assert_eq!(
        rejection.messages(),
        vec!["per_pod PLATFORM/SEED at limit (5/5)"]
    );
    assert!(rejection.failures.iter().all(|f| f.kind == FailureKind::Capacity));
    assert_eq!(current(&engine, per_pod(Gate::Seed)), 5);
    assert_eq!(current(&engine, per_pod(Gate::Spark)), 1);
    assert_eq!(current(&engine, Scope::Portfolio), 6);
}

#[test]
fn test_promotion_with_room_moves_counters() {
    let engine = engine();
    let item = spark_item_ready_for_seed();
    assert!(engine.admit(&item).expect("admit").ok);
    occupy(&engine, Gate::Seed, 4);

    let outcome = engine
        .promote(&item, Gate::Seed, "lead", &PromoteOptions::default())
        .expect("promote");

    let PromotionOutcome::Approved { item: moved, record } = outcome else {
        panic!("expected approval");
    };
    assert_eq!(moved.gate, Gate::Seed);
    assert!(moved.next_review.is_some());
    assert_eq!(record.outcome, Outcome::Approved);
    assert_eq!(record.from, Gate::Spark);
    assert_eq!(record.to, Gate::Seed);
    assert!(record.criteria.iter().all(|c| c.passed));

    assert_eq!(current(&engine, per_pod(Gate::Seed)), 5);
    assert_eq!(current(&engine, per_pod(Gate::Spark)), 0);
    assert_eq!(current(&engine, Scope::CrossPod { gate: Gate::Seed }), 5);
    assert_eq!(current(&engine, Scope::Portfolio), 5);
}

#[test]
fn test_kill_skips_capacity_and_releases_scopes() {
    let engine = engine();
    let mut item = Item::new("Legacy importer".to_string(), "ines".to_string());
    item.pod = Some(Pod::Platform);
    item.gate = Gate::Ship;
    assert!(engine.admit(&item).expect("admit").ok);

    // A full portfolio must not matter for a move into a terminal gate
    engine
        .wip()
        .store()
        .set_limit(&Scope::Portfolio, 1)
        .expect("set limit");

    let outcome = engine
        .promote(&item, Gate::Killed, "lead", &PromoteOptions::default())
        .expect("promote");
    let PromotionOutcome::Approved { item: killed, record } = outcome else {
        panic!("expected approval");
    };
    assert_eq!(killed.gate, Gate::Killed);
    assert_eq!(killed.next_review, None);
    assert!(record.criteria.is_empty());

    assert_eq!(current(&engine, per_pod(Gate::Ship)), 0);
    assert_eq!(current(&engine, Scope::CrossPod { gate: Gate::Ship }), 0);
    assert_eq!(current(&engine, Scope::Portfolio), 0);
}

#[test]
fn test_reject_twice_changes_nothing() {
    let engine = engine();
    let item = spark_item_ready_for_seed();
    assert!(engine.admit(&item).expect("admit").ok);
    let before = engine
        .wip()
        .store()
        .list(&Default::default())
        .expect("list");

    let first = engine.reject(&item, "hypothesis too vague", "lead").expect("reject");
    let second = engine.reject(&item, "hypothesis too vague", "lead").expect("reject");

    assert_eq!(first.to, Gate::Spark);
    assert_eq!(second.to, Gate::Spark);
    assert_eq!(item.gate, Gate::Spark);
    let after = engine
        .wip()
        .store()
        .list(&Default::default())
        .expect("list");
    assert_eq!(before, after);
}

#[test]
fn test_forward_skip_rejected_even_with_override() {
    let engine = engine();
    let item = spark_item_ready_for_seed();
    assert!(engine.admit(&item).expect("admit").ok);

    let options = PromoteOptions {
        override_checks: true,
        comments: None,
    };
    let outcome = engine
        .promote(&item, Gate::Scaffold, "lead", &options)
        .expect("promote");
    let PromotionOutcome::Rejected(rejection) = outcome else {
        panic!("expected sequencing rejection");
    };
    assert!(rejection.has_kind(FailureKind::Sequencing));
    assert_eq!(current(&engine, per_pod(Gate::Spark)), 1);
    assert_eq!(current(&engine, per_pod(Gate::Scaffold)), 0);
}

#[test]
fn test_parked_item_resurrects_into_full_portfolio_only_with_room() {
    let engine = engine();
    let item = spark_item_ready_for_seed();
    assert!(engine.admit(&item).expect("admit").ok);

    let options = PromoteOptions::default();
    let PromotionOutcome::Approved { item: parked, .. } = engine
        .promote(&item, Gate::Parked, "lead", &options)
        .expect("park")
    else {
        panic!("parking is always legal");
    };
    assert_eq!(current(&engine, Scope::Portfolio), 0);

    engine
        .wip()
        .store()
        .set_limit(&Scope::Portfolio, 0)
        .expect("set limit");
    let outcome = engine
        .promote(&parked, Gate::Spark, "lead", &options)
        .expect("resurrect");
    let PromotionOutcome::Rejected(rejection) = outcome else {
        panic!("expected capacity rejection");
    };
    assert_eq!(rejection.messages(), vec!["portfolio at limit (0/0)"]);

    engine
        .wip()
        .store()
        .set_limit(&Scope::Portfolio, 10)
        .expect("set limit");
    let outcome = engine
        .promote(&parked, Gate::Spark, "lead", &options)
        .expect("resurrect");
    assert!(outcome.is_approved());
    assert_eq!(current(&engine, Scope::Portfolio), 1);
}

#[test]
fn test_full_portfolio_rejects_active_moves() {
    let engine = engine();
    let item = spark_item_ready_for_seed();
    assert!(engine.admit(&item).expect("admit").ok);
    engine
        .wip()
        .store()
        .set_limit(&Scope::Portfolio, 1)
        .expect("set limit");

    let preview = engine.preview(&item, Gate::Seed, true).expect("preview");
    assert_eq!(preview.capacity.violations, vec!["portfolio at limit (1/1)"]);
    assert!(!preview.would_pass());

    let options = PromoteOptions {
        override_checks: true,
        comments: None,
    };
    let outcome = engine
        .promote(&item, Gate::Seed, "lead", &options)
        .expect("promote");
    let PromotionOutcome::Rejected(rejection) = outcome else {
        panic!("expected capacity rejection");
    };
    assert_eq!(rejection.messages(), vec!["portfolio at limit (1/1)"]);
    assert_eq!(current(&engine, per_pod(Gate::Spark)), 1);
    assert_eq!(current(&engine, per_pod(Gate::Seed)), 0);
    assert_eq!(current(&engine, Scope::Portfolio), 1);
}

#[test]
fn test_item_without_pod_skips_per_pod_scopes() {
    let engine = engine();
    let mut item = Item::new("Shared design tokens".to_string(), "ines".to_string());
    item.gate = Gate::Seed;
    assert!(engine.admit(&item).expect("admit").ok);

    let options = PromoteOptions {
        override_checks: true,
        comments: None,
    };
    let outcome = engine
        .promote(&item, Gate::Scaffold, "lead", &options)
        .expect("promote");
    assert!(outcome.is_approved());
    assert_eq!(current(&engine, Scope::CrossPod { gate: Gate::Scaffold }), 1);
    for pod in Pod::ALL {
        let scope = Scope::PerPod {
            pod,
            gate: Gate::Scaffold,
        };
        assert_eq!(current(&engine, scope), 0);
    }
}

#[test]
fn test_uninitialized_scope_is_an_error_not_a_rejection() {
    let store = MemoryLimitStore::new();
    let engine = GateTransitionEngine::new(
        Arc::new(GateCatalog::standard()),
        Arc::new(CriteriaEvaluator::standard()),
        Arc::new(store),
    )
    .expect("engine");
    let mut item = Item::new("Orphan".to_string(), "ines".to_string());
    item.gate = Gate::Seed;

    let options = PromoteOptions {
        override_checks: true,
        comments: None,
    };
    let err = engine
        .promote(&item, Gate::Scaffold, "lead", &options)
        .unwrap_err();
    assert!(err.is_fatal());
}
