// Rust guideline compliant 2026-10-15

//! The on-disk workspace: configuration, item and record storage, and the
//! transition engine over the file-backed WIP counters.
//!
//! Every operation that reads an item and writes it back holds the items
//! file lock for the whole read-modify-write, so concurrent `sgate`
//! processes cannot lose each other's updates. Counter changes go through
//! the engine and take the limits file lock on their own.

use crate::error::{AppError, Result};
use crate::metrics::{gate_metrics, GateMetric};
use crate::recount::count_occupancy;
use crate::repo::RepoContext;
use crate::time::unix_timestamp;
use serde::Serialize;
use stagegate_core::{
    identity, wip, CapacityResult, Config, CounterPlan, Drift, FileLimitStore, Gate,
    GateTransitionEngine, Item, LimitFilter, LimitRecord, LimitStore, Pod, PodChange, Preview,
    PromoteOptions, PromotionOutcome, Scope, Storage, TransitionRecord, Utilization,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Inputs for a new item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// Item title.
    pub title: String,
    /// Author identifier.
    pub author: String,
    /// Owning pod, if known.
    pub pod: Option<Pod>,
    /// Initial facts.
    pub facts: BTreeMap<String, serde_json::Value>,
}

/// Result of creating an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "admission", rename_all = "snake_case")]
pub enum Admission {
    /// The item was counted and stored.
    Admitted {
        /// The stored item.
        item: Item,
    },
    /// A SPARK scope was full; nothing was stored.
    Refused {
        /// The full scopes.
        capacity: CapacityResult,
    },
}

/// An opened Stagegate repository.
pub struct Workspace {
    repo: RepoContext,
    config: Config,
    items: Storage<Item>,
    transitions: Storage<TransitionRecord>,
    engine: GateTransitionEngine<FileLimitStore>,
}

impl Workspace {
    /// Opens the repository, loading configuration and wiring the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - A catalog criterion has no rule
    /// - A storage file cannot be opened
    pub fn open(repo: RepoContext) -> Result<Self> {
        let config = repo.load_config()?;
        let engine = GateTransitionEngine::new(
            Arc::new(config.catalog()?),
            Arc::new(config.evaluator()),
            Arc::new(repo.open_limits()?),
        )?;

        Ok(Self {
            items: repo.open_items()?,
            transitions: repo.open_transitions()?,
            repo,
            config,
            engine,
        })
    }

    /// Returns the repository paths.
    #[must_use]
    pub fn repo(&self) -> &RepoContext {
        &self.repo
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the transition engine.
    #[must_use]
    pub fn engine(&self) -> &GateTransitionEngine<FileLimitStore> {
        &self.engine
    }

    /// Loads every stored item.
    ///
    /// # Errors
    ///
    /// Returns an error if the items file cannot be read.
    pub fn load_items(&self) -> Result<Vec<Item>> {
        Ok(self.items.load_all()?)
    }

    /// Finds an item by full or partial ID.
    ///
    /// # Errors
    ///
    /// Returns an error if no item or more than one item matches.
    pub fn find(&self, partial: &str) -> Result<Item> {
        Ok(find_in(&self.items.load_all()?, partial)?)
    }

    /// Creates a SPARK item, counting it against its WIP scopes.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is invalid, a scope was never
    /// initialized, or storage fails.
    pub fn create(&self, new: NewItem) -> Result<Admission> {
        let mut item = Item::new(new.title, new.author);
        item.pod = new.pod;
        item.facts = new.facts;
        item.next_review = self
            .engine
            .catalog()
            .config_for(item.gate)?
            .next_review(item.created_at);
        item.validate()?;

        Ok(self.items.with_lock(|| {
            let existing = self.items.load_all()?;
            let mut nonce = 0;
            while existing.iter().any(|other| other.id == item.id) {
                nonce += 1;
                item.id = identity::generate_id(&item.title, &item.author, item.created_at, nonce);
            }

            let capacity = self.engine.admit(&item)?;
            if !capacity.ok {
                return Ok(Admission::Refused { capacity });
            }

            if let Err(e) = self.items.save(&item) {
                self.revert(&item.id, &wip::entry_plan(item.pod, item.gate));
                return Err(e);
            }
            Ok(Admission::Admitted { item })
        })?)
    }

    /// Undoes committed counter changes for an item that could not be stored.
    fn revert(&self, item_id: &str, plan: &CounterPlan) {
        if let Err(e) = self.engine.wip().revert(plan) {
            tracing::error!(item = %item_id, error = %e, "failed to revert counters; run 'sgate wip recount'");
        }
    }

    /// Appends a record for a change that is already stored.
    fn append_record(&self, record: &TransitionRecord) {
        if let Err(e) = self.transitions.append(record) {
            tracing::error!(item = %record.item_id, record = %record.id, error = %e, "failed to append transition record");
        }
    }

    /// Promotes an item and persists the outcome.
    ///
    /// The transition record is appended for approvals and rejections alike;
    /// the item is rewritten only when approved. If the item cannot be
    /// rewritten, the counter changes are reverted and nothing is recorded.
    /// A record that cannot be appended after the item was stored is logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be resolved, the engine reports a
    /// configuration or store fault, or storage fails.
    pub fn promote(
        &self,
        partial: &str,
        target: Gate,
        actor: &str,
        options: &PromoteOptions,
    ) -> Result<PromotionOutcome> {
        Ok(self.items.with_lock(|| {
            let item = find_in(&self.items.load_all()?, partial)?;
            let outcome = self.engine.promote(&item, target, actor, options)?;
            match &outcome {
                PromotionOutcome::Approved { item: moved, record } => {
                    if let Err(e) = self.items.save(moved) {
                        self.revert(&item.id, &wip::move_plan(item.pod, item.gate, target));
                        return Err(e);
                    }
                    self.append_record(record);
                }
                PromotionOutcome::Rejected(rejection) => {
                    self.transitions.append(&rejection.record)?;
                }
            }
            Ok(outcome)
        })?)
    }

    /// Reports what promoting an item would do, without changing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be resolved or the engine reports a
    /// configuration or store fault.
    pub fn preview(&self, partial: &str, target: Gate, override_checks: bool) -> Result<Preview> {
        let item = self.find(partial)?;
        Ok(self.engine.preview(&item, target, override_checks)?)
    }

    /// Records a review rejection on the item's current gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be resolved, `reason` is blank, or
    /// the record cannot be appended.
    pub fn reject(&self, partial: &str, reason: &str, actor: &str) -> Result<TransitionRecord> {
        let item = self.find(partial)?;
        let record = self.engine.reject(&item, reason, actor)?;
        self.transitions.append(&record)?;
        Ok(record)
    }

    /// Returns every transition record for an item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be resolved or a file cannot be read.
    pub fn history(&self, partial: &str) -> Result<Vec<TransitionRecord>> {
        let item = self.find(partial)?;
        let mut records: Vec<TransitionRecord> = self
            .transitions
            .load_all()?
            .into_iter()
            .filter(|record| record.item_id == item.id)
            .collect();
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }

    /// Records a fact on an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank, the item cannot be resolved, or
    /// storage fails.
    pub fn set_fact(&self, partial: &str, key: &str, value: serde_json::Value) -> Result<Item> {
        if key.trim().is_empty() {
            return Err(AppError::InvalidInput("Fact key cannot be empty".to_string()));
        }

        Ok(self.items.with_lock(|| {
            let mut item = find_in(&self.items.load_all()?, partial)?;
            item.set_fact(key.trim(), value);
            item.updated_at = unix_timestamp();
            self.items.save(&item)?;
            Ok(item)
        })?)
    }

    /// Moves an item to another pod, or clears its pod.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be resolved, a scope is unknown, or
    /// storage fails.
    pub fn assign(&self, partial: &str, pod: Option<Pod>) -> Result<PodChange> {
        Ok(self.items.with_lock(|| {
            let item = find_in(&self.items.load_all()?, partial)?;
            let change = self.engine.reassign_pod(&item, pod)?;
            if let PodChange::Moved(moved) = &change {
                if let Err(e) = self.items.save(moved) {
                    if item.pod != pod {
                        self.revert(&item.id, &wip::pod_change_plan(item.pod, pod, item.gate));
                    }
                    return Err(e);
                }
            }
            Ok(change)
        })?)
    }

    /// Reports utilization of the WIP scopes matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits file cannot be read.
    pub fn utilization(&self, filter: &LimitFilter) -> Result<Vec<Utilization>> {
        Ok(self.engine.wip().utilization(filter)?)
    }

    /// Changes the ceiling of one WIP scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the limits file cannot be written.
    pub fn set_limit(&self, scope: &Scope, limit: u32) -> Result<LimitRecord> {
        let record = self.engine.wip().store().set_limit(scope, limit)?;
        tracing::info!(scope = %scope, limit, "WIP limit changed");
        Ok(record)
    }

    /// Recomputes every counter from the stored items and overwrites the ones
    /// that drifted.
    ///
    /// # Errors
    ///
    /// Returns an error if an item occupies a scope that was never
    /// initialized, or a file cannot be read or written.
    pub fn recount(&self) -> Result<Vec<Drift>> {
        Ok(self.items.with_lock(|| {
            let expected = count_occupancy(&self.items.load_all_strict()?);
            let drifts = self.engine.wip().store().reconcile(&expected)?;
            for drift in &drifts {
                tracing::warn!(
                    scope = %drift.scope,
                    recorded = drift.recorded,
                    expected = drift.expected,
                    "counter drift corrected"
                );
            }
            Ok(drifts)
        })?)
    }

    /// Counts items per gate as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the items file cannot be read.
    pub fn metrics(&self, now: i64) -> Result<Vec<GateMetric>> {
        Ok(gate_metrics(&self.items.load_all()?, now))
    }
}

/// Builds a WIP scope from optional selectors.
///
/// No selectors means the portfolio; a gate alone means cross_pod; a gate and
/// a pod mean per_pod.
///
/// # Errors
///
/// Returns an error if a pod is given without a gate, or the gate is terminal.
pub fn scope_from_parts(gate: Option<Gate>, pod: Option<Pod>) -> Result<Scope> {
    match (gate, pod) {
        (None, None) => Ok(Scope::Portfolio),
        (None, Some(_)) => Err(AppError::InvalidInput(
            "A pod scope also needs a gate".to_string(),
        )),
        (Some(gate), _) if gate.is_terminal() => Err(AppError::InvalidInput(format!(
            "{} is terminal and has no WIP scope",
            gate
        ))),
        (Some(gate), None) => Ok(Scope::CrossPod { gate }),
        (Some(gate), Some(pod)) => Ok(Scope::PerPod { pod, gate }),
    }
}

fn find_in(items: &[Item], partial: &str) -> stagegate_core::Result<Item> {
    let id = identity::resolve_partial_id(partial, items)?;
    items
        .iter()
        .find(|item| item.id == id)
        .cloned()
        .ok_or(stagegate_core::Error::NotFound(id))
}
