// Rust guideline compliant 2026-10-14

//! Tests shared by every [`LimitStore`] implementation.
//!
//! Each check runs against the in-memory store and the file-backed store.

use stagegate_core::{
    CommitOutcome, CounterPlan, Error, FileLimitStore, Gate, LimitFilter, LimitStore,
    MemoryLimitStore, Pod, Scope, ScopeKind, WipDefaults,
};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn memory() -> MemoryLimitStore {
    MemoryLimitStore::with_defaults(&WipDefaults::default()).expect("defaults")
}

fn file(temp_dir: &TempDir) -> FileLimitStore {
    let store = FileLimitStore::new(temp_dir.path().join("limits.jsonl")).expect("file store");
    store.initialize(&WipDefaults::default()).expect("initialize");
    store
}

fn ratio_ship() -> Scope {
    Scope::PerPod {
        pod: Pod::Ratio,
        gate: Gate::Ship,
    }
}

fn check_adjust_and_exceeded(store: &dyn LimitStore) {
    let record = store.adjust(&ratio_ship(), 1).expect("adjust");
    assert_eq!(record.current, 1);
    assert!(!record.exceeded);

    let record = store.adjust(&ratio_ship(), 1).expect("adjust");
    assert_eq!(record.current, 2);
    assert!(record.exceeded, "SHIP per-pod default limit is 2");

    let err = store.adjust(&ratio_ship(), -3).unwrap_err();
    assert!(matches!(err, Error::CounterUnderflow { current: 2, .. }));
    assert_eq!(store.get(&ratio_ship()).expect("get").expect("scope").current, 2);
}

fn check_list_filters(store: &dyn LimitStore) {
    let all = store.list(&LimitFilter::default()).expect("list");
    assert_eq!(all.len(), Pod::ALL.len() * 5 + 5 + 1);

    let cross = store
        .list(&LimitFilter {
            kind: Some(ScopeKind::CrossPod),
            ..LimitFilter::default()
        })
        .expect("list");
    assert_eq!(cross.len(), 5);

    let seed_for_paintbox = store
        .list(&LimitFilter {
            gate: Some(Gate::Seed),
            pod: Some(Pod::Paintbox),
            ..LimitFilter::default()
        })
        .expect("list");
    assert_eq!(seed_for_paintbox.len(), 1);
    assert_eq!(seed_for_paintbox[0].limit, 5);

    store.set_limit(&Scope::CrossPod { gate: Gate::Scale }, 0).expect("limit");
    let exceeded = store
        .list(&LimitFilter {
            exceeded_only: true,
            ..LimitFilter::default()
        })
        .expect("list");
    assert_eq!(exceeded.len(), 1);
    assert_eq!(exceeded[0].scope, Scope::CrossPod { gate: Gate::Scale });
}

fn check_guarded_commit(store: &dyn LimitStore) {
    let seed = Scope::CrossPod { gate: Gate::Seed };
    store.set_limit(&seed, 1).expect("limit");
    let plan = CounterPlan {
        guards: vec![seed, Scope::Portfolio],
        deltas: vec![(seed, 1), (Scope::Portfolio, 1)],
    };

    assert!(matches!(store.commit(&plan).expect("commit"), CommitOutcome::Applied(_)));
    match store.commit(&plan).expect("commit") {
        CommitOutcome::Blocked(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].scope, seed);
        }
        CommitOutcome::Applied(_) => panic!("guard at limit must block"),
    }
    assert_eq!(store.get(&Scope::Portfolio).expect("get").expect("scope").current, 1);
}

fn check_unknown_scope_leaves_state(store: &dyn LimitStore) {
    let plan = CounterPlan {
        guards: Vec::new(),
        deltas: vec![(Scope::Portfolio, 1), (Scope::CrossPod { gate: Gate::Killed }, 1)],
    };
    assert!(matches!(store.commit(&plan), Err(Error::UnknownScope(_))));
    assert_eq!(store.get(&Scope::Portfolio).expect("get").expect("scope").current, 0);
}

fn check_reconcile(store: &dyn LimitStore) {
    store.adjust(&Scope::Portfolio, 4).expect("adjust");
    let expected = BTreeMap::from([(Scope::Portfolio, 2), (ratio_ship(), 1)]);

    let drifts = store.reconcile(&expected).expect("reconcile");
    assert_eq!(drifts.len(), 2);
    assert!(drifts
        .iter()
        .any(|d| d.scope == Scope::Portfolio && d.recorded == 4 && d.expected == 2));
    assert!(store.reconcile(&expected).expect("reconcile").is_empty());

    let bogus = BTreeMap::from([(Scope::CrossPod { gate: Gate::Parked }, 1)]);
    assert!(store.reconcile(&bogus).is_err());
    assert_eq!(store.get(&Scope::Portfolio).expect("get").expect("scope").current, 2);
}

#[test]
fn test_adjust_and_exceeded() {
    check_adjust_and_exceeded(&memory());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    check_adjust_and_exceeded(&file(&temp_dir));
}

#[test]
fn test_list_filters() {
    check_list_filters(&memory());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    check_list_filters(&file(&temp_dir));
}

#[test]
fn test_guarded_commit() {
    check_guarded_commit(&memory());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    check_guarded_commit(&file(&temp_dir));
}

#[test]
fn test_unknown_scope_leaves_state() {
    check_unknown_scope_leaves_state(&memory());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    check_unknown_scope_leaves_state(&file(&temp_dir));
}

#[test]
fn test_reconcile() {
    check_reconcile(&memory());
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    check_reconcile(&file(&temp_dir));
}

#[test]
fn test_file_store_rejects_per_person_rows() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("limits.jsonl");
    fs::write(
        &path,
        r#"{"type":"per_person","limit":3,"current":0,"exceeded":false,"last_updated":0}
"#,
    )
    .expect("write");

    let store = FileLimitStore::new(path).expect("file store");
    assert!(matches!(store.get(&Scope::Portfolio), Err(Error::Json(_))));
}

#[test]
fn test_file_store_rows_are_flat_and_unique() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = file(&temp_dir);
    store.adjust(&ratio_ship(), 1).expect("adjust");

    let content = fs::read_to_string(temp_dir.path().join("limits.jsonl")).expect("read");
    let rows: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("row"))
        .collect();
    assert_eq!(rows.len(), Pod::ALL.len() * 5 + 5 + 1);

    let ratio = rows
        .iter()
        .find(|row| row["type"] == "per_pod" && row["pod"] == "RATIO" && row["gate"] == "SHIP")
        .expect("RATIO/SHIP row");
    assert_eq!(ratio["current"], 1);
    assert_eq!(ratio["limit"], 2);
    assert!(rows.iter().filter(|row| row["type"] == "portfolio").count() == 1);
}

#[test]
fn test_initialize_is_idempotent_on_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = file(&temp_dir);
    store.set_limit(&Scope::Portfolio, 12).expect("limit");

    assert_eq!(store.initialize(&WipDefaults::default()).expect("initialize"), 0);
    assert_eq!(store.get(&Scope::Portfolio).expect("get").expect("scope").limit, 12);
}
