// Rust guideline compliant 2026-10-13

//! JSONL-backed [`LimitStore`] shared between processes.
//!
//! Each operation takes an in-process mutex and an exclusive advisory file
//! lock, reloads the rows, applies the change and rewrites the file
//! atomically. That makes every operation linearizable across threads and
//! processes at the cost of whole-file granularity.

use crate::limits::{
    execute_plan, CommitOutcome, CounterPlan, Drift, LimitFilter, LimitRecord, LimitStore, Scope,
    WipDefaults,
};
use crate::storage::{read_jsonl_strict, with_file_lock, write_jsonl_atomic};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Counter store persisted as one JSON row per scope.
#[derive(Debug)]
pub struct FileLimitStore {
    path: PathBuf,
    local: Mutex<()>,
}

impl FileLimitStore {
    /// Opens (without creating) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is empty.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path cannot be empty",
            )));
        }
        Ok(Self {
            path,
            local: Mutex::new(()),
        })
    }

    /// Returns the JSONL path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<Scope, LimitRecord>> {
        let rows: Vec<LimitRecord> = read_jsonl_strict(&self.path)?;
        let mut records = BTreeMap::new();
        for row in rows {
            let scope = row.scope;
            if records.insert(scope, row).is_some() {
                return Err(Error::Config(format!(
                    "{} has more than one row for {}",
                    self.path.display(),
                    scope
                )));
            }
        }
        Ok(records)
    }

    fn store(&self, records: &BTreeMap<Scope, LimitRecord>) -> Result<()> {
        let rows: Vec<&LimitRecord> = records.values().collect();
        write_jsonl_atomic(&self.path, &rows)
    }

    fn read<R>(&self, f: impl FnOnce(&BTreeMap<Scope, LimitRecord>) -> R) -> Result<R> {
        let _local = self.local.lock();
        with_file_lock(&self.path, || Ok(f(&self.load()?)))
    }

    /// Runs `f` on the loaded rows and persists them when `f` reports a change.
    fn update<R>(
        &self,
        f: impl FnOnce(&mut BTreeMap<Scope, LimitRecord>) -> Result<(R, bool)>,
    ) -> Result<R> {
        let _local = self.local.lock();
        with_file_lock(&self.path, || {
            let mut records = self.load()?;
            let (result, changed) = f(&mut records)?;
            if changed {
                self.store(&records)?;
            }
            Ok(result)
        })
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl LimitStore for FileLimitStore {
    fn get(&self, scope: &Scope) -> Result<Option<LimitRecord>> {
        self.read(|records| records.get(scope).cloned())
    }

    fn list(&self, filter: &LimitFilter) -> Result<Vec<LimitRecord>> {
        self.read(|records| {
            records
                .values()
                .filter(|record| filter.matches(record))
                .cloned()
                .collect()
        })
    }

    fn set_limit(&self, scope: &Scope, limit: u32) -> Result<LimitRecord> {
        let record = self.update(|records| {
            let timestamp = now();
            let record = records
                .entry(*scope)
                .or_insert_with(|| LimitRecord::new(*scope, limit, timestamp));
            record.set_limit(limit, timestamp);
            Ok((record.clone(), true))
        })?;
        tracing::info!(scope = %scope, limit, current = record.current, "limit updated");
        Ok(record)
    }

    fn commit(&self, plan: &CounterPlan) -> Result<CommitOutcome> {
        self.update(|records| {
            let mut involved: BTreeMap<Scope, &mut LimitRecord> = records
                .iter_mut()
                .map(|(scope, record)| (*scope, record))
                .collect();
            let outcome = execute_plan(plan, &mut involved, now())?;
            let changed = matches!(outcome, CommitOutcome::Applied(_));
            Ok((outcome, changed))
        })
    }

    fn initialize(&self, defaults: &WipDefaults) -> Result<usize> {
        let scopes = defaults.scopes()?;
        let created = self.update(|records| {
            let timestamp = now();
            let mut created = 0;
            for (scope, limit) in scopes {
                records.entry(scope).or_insert_with(|| {
                    created += 1;
                    LimitRecord::new(scope, limit, timestamp)
                });
            }
            // Always write so an empty store materializes on disk
            Ok((created, true))
        })?;
        tracing::debug!(created, path = %self.path.display(), "initialized WIP scopes");
        Ok(created)
    }

    fn reconcile(&self, expected: &BTreeMap<Scope, u32>) -> Result<Vec<Drift>> {
        self.update(|records| {
            if let Some(unknown) = expected.keys().find(|scope| !records.contains_key(*scope)) {
                return Err(Error::UnknownScope(*unknown));
            }

            let timestamp = now();
            let mut drifts = Vec::new();
            for (scope, record) in records.iter_mut() {
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
            let changed = !drifts.is_empty();
            Ok((drifts, changed))
        })
    }
}
