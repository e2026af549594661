// Rust guideline compliant 2026-10-13

//! In-process [`LimitStore`] guarded by one mutex per scope.

use crate::limits::{
    execute_plan, CommitOutcome, CounterPlan, Drift, LimitFilter, LimitRecord, LimitStore, Scope,
    WipDefaults,
};
use crate::{Error, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Counter store held in memory.
///
/// The outer map is only write-locked to add scopes or reconcile. Commits
/// take the read lock and then lock the involved scopes in key order, so
/// operations on disjoint scopes proceed in parallel and overlapping commits
/// cannot deadlock.
#[derive(Debug, Default)]
pub struct MemoryLimitStore {
    records: RwLock<BTreeMap<Scope, Arc<Mutex<LimitRecord>>>>,
}

impl MemoryLimitStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with every default scope initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults are invalid.
    pub fn with_defaults(defaults: &WipDefaults) -> Result<Self> {
        let store = Self::new();
        store.initialize(defaults)?;
        Ok(store)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl LimitStore for MemoryLimitStore {
    fn get(&self, scope: &Scope) -> Result<Option<LimitRecord>> {
        let records = self.records.read();
        Ok(records.get(scope).map(|record| record.lock().clone()))
    }

    fn list(&self, filter: &LimitFilter) -> Result<Vec<LimitRecord>> {
        let records = self.records.read();
        Ok(records
            .values()
            .map(|record| record.lock().clone())
            .filter(|record| filter.matches(record))
            .collect())
    }

    fn set_limit(&self, scope: &Scope, limit: u32) -> Result<LimitRecord> {
        let existing = self.records.read().get(scope).cloned();
        let handle = match existing {
            Some(handle) => handle,
            None => {
                let mut records = self.records.write();
                Arc::clone(
                    records
                        .entry(*scope)
                        .or_insert_with(|| Arc::new(Mutex::new(LimitRecord::new(*scope, limit, now())))),
                )
            }
        };

        let mut record = handle.lock();
        record.set_limit(limit, now());
        tracing::info!(scope = %scope, limit, current = record.current, "limit updated");
        Ok(record.clone())
    }

    fn commit(&self, plan: &CounterPlan) -> Result<CommitOutcome> {
        let scopes: BTreeSet<Scope> = plan.scopes().collect();

        let handles: Vec<(Scope, Arc<Mutex<LimitRecord>>)> = {
            let records = self.records.read();
            scopes
                .iter()
                .map(|scope| {
                    records
                        .get(scope)
                        .map(|handle| (*scope, Arc::clone(handle)))
                        .ok_or(Error::UnknownScope(*scope))
                })
                .collect::<Result<_>>()?
        };

        // BTreeSet iteration order gives a global lock order
        let mut guards: Vec<_> = handles
            .iter()
            .map(|(scope, handle)| (*scope, handle.lock()))
            .collect();
        let mut locked: BTreeMap<Scope, &mut LimitRecord> = guards
            .iter_mut()
            .map(|(scope, guard)| (*scope, &mut **guard))
            .collect();

        execute_plan(plan, &mut locked, now())
    }

    fn initialize(&self, defaults: &WipDefaults) -> Result<usize> {
        let scopes = defaults.scopes()?;
        let timestamp = now();
        let mut records = self.records.write();
        let mut created = 0;
        for (scope, limit) in scopes {
            records.entry(scope).or_insert_with(|| {
                created += 1;
                Arc::new(Mutex::new(LimitRecord::new(scope, limit, timestamp)))
            });
        }
        tracing::debug!(created, "initialized WIP scopes");
        Ok(created)
    }

    fn reconcile(&self, expected: &BTreeMap<Scope, u32>) -> Result<Vec<Drift>> {
        let records = self.records.write();
        if let Some(unknown) = expected.keys().find(|scope| !records.contains_key(*scope)) {
            return Err(Error::UnknownScope(*unknown));
        }

        let timestamp = now();
        let mut drifts = Vec::new();
        for (scope, handle) in records.iter() {
            let mut record = handle.lock();
            let target = expected.get(scope).copied().unwrap_or(0);
            if record.current != target {
                drifts.push(Drift {
                    scope: *scope,
                    recorded: record.current,
                    expected: target,
                });
                record.set_current(target, timestamp);
            }
        }
        Ok(drifts)
    }
}
