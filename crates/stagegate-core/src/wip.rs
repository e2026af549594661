// Rust guideline compliant 2026-10-13

//! WIP enforcement on top of a [`LimitStore`].
//!
//! A scope is violated when its counter is already at the limit before the
//! prospective increment, so the item that would land on a full scope is the
//! one rejected. Moves into terminal gates occupy nothing and are never
//! checked.

use crate::limits::{
    occupied_scopes, CommitOutcome, CounterPlan, LimitFilter, LimitRecord, LimitStore, Scope,
};
use crate::{Error, Gate, Item, Pod, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Outcome of a capacity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityResult {
    /// True if no scope is at its limit.
    pub ok: bool,
    /// One message per violated scope, in enforcement order.
    pub violations: Vec<String>,
}

impl CapacityResult {
    fn from_blocking(blocking: &[LimitRecord]) -> Self {
        Self {
            ok: blocking.is_empty(),
            violations: blocking.iter().map(violation_message).collect(),
        }
    }

    /// A passing result.
    #[must_use]
    pub fn clear() -> Self {
        Self {
            ok: true,
            violations: Vec::new(),
        }
    }
}

/// Formats the violation message for a full scope, e.g.
/// `per_pod PLATFORM/SEED at limit (5/5)`.
#[must_use]
pub fn violation_message(record: &LimitRecord) -> String {
    format!(
        "{} at limit ({}/{})",
        record.scope, record.current, record.limit
    )
}

/// Occupancy report for one scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utilization {
    /// Scope reported on.
    pub scope: Scope,
    /// Live items in the scope.
    pub current: u32,
    /// Ceiling.
    pub limit: u32,
    /// `current / limit` as a percentage.
    pub percent: f64,
    /// Whether the scope is at or above its limit.
    pub exceeded: bool,
}

impl From<&LimitRecord> for Utilization {
    fn from(record: &LimitRecord) -> Self {
        Self {
            scope: record.scope,
            current: record.current,
            limit: record.limit,
            percent: record.utilization(),
            exceeded: record.exceeded,
        }
    }
}

/// Scopes that gain an occupant when an item moves from `(from_pod, from)`
/// to `(to_pod, to)`.
#[must_use]
pub fn entered_scopes(from_pod: Option<Pod>, from: Gate, to_pod: Option<Pod>, to: Gate) -> Vec<Scope> {
    let left = occupied_scopes(from_pod, from);
    occupied_scopes(to_pod, to)
        .into_iter()
        .filter(|scope| !left.contains(scope))
        .collect()
}

/// Builds the counter plan for moving an item from `from` to `to`.
///
/// Every scope of the old gate is decremented and every scope of the new
/// gate incremented; scopes present in both net to zero. Every scope of a
/// non-terminal target is guarded, portfolio included.
#[must_use]
pub fn move_plan(pod: Option<Pod>, from: Gate, to: Gate) -> CounterPlan {
    CounterPlan {
        guards: occupied_scopes(pod, to),
        deltas: placement_deltas(pod, from, pod, to),
    }
}

/// Builds the counter plan for an item entering `gate` from nowhere.
#[must_use]
pub fn entry_plan(pod: Option<Pod>, gate: Gate) -> CounterPlan {
    let scopes = occupied_scopes(pod, gate);
    CounterPlan {
        deltas: scopes.iter().map(|scope| (*scope, 1)).collect(),
        guards: scopes,
    }
}

/// Builds the counter plan for moving an item between pods within `gate`.
///
/// Only the scopes the item newly enters are guarded.
#[must_use]
pub fn pod_change_plan(from_pod: Option<Pod>, to_pod: Option<Pod>, gate: Gate) -> CounterPlan {
    CounterPlan {
        guards: entered_scopes(from_pod, gate, to_pod, gate),
        deltas: placement_deltas(from_pod, gate, to_pod, gate),
    }
}

/// Builds the plan that undoes `plan` without guards.
#[must_use]
pub fn inverse_plan(plan: &CounterPlan) -> CounterPlan {
    CounterPlan {
        guards: Vec::new(),
        deltas: plan
            .deltas
            .iter()
            .map(|(scope, delta)| (*scope, -delta))
            .collect(),
    }
}

fn placement_deltas(
    from_pod: Option<Pod>,
    from: Gate,
    to_pod: Option<Pod>,
    to: Gate,
) -> Vec<(Scope, i64)> {
    occupied_scopes(from_pod, from)
        .into_iter()
        .map(|scope| (scope, -1))
        .chain(occupied_scopes(to_pod, to).into_iter().map(|scope| (scope, 1)))
        .collect()
}

/// Counts live items per scope, the value every counter should hold.
pub fn expected_counts<'a>(items: impl IntoIterator<Item = &'a Item>) -> BTreeMap<Scope, u32> {
    let mut counts = BTreeMap::new();
    for item in items {
        for scope in occupied_scopes(item.pod, item.gate) {
            *counts.entry(scope).or_insert(0) += 1;
        }
    }
    counts
}

/// Capacity checks and counter commits for gate moves.
#[derive(Debug)]
pub struct WipEnforcer<S: ?Sized> {
    store: Arc<S>,
}

impl<S: LimitStore + ?Sized> WipEnforcer<S> {
    /// Creates an enforcer over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks every scope an item of `pod` would occupy in `target`.
    ///
    /// Evaluates per_pod (when `pod` is set), cross_pod and portfolio, and
    /// reports every violation rather than stopping at the first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScope`] if a scope was never initialized, or a
    /// store error.
    pub fn check_capacity(&self, pod: Option<Pod>, target: Gate) -> Result<CapacityResult> {
        self.check_scopes(&occupied_scopes(pod, target))
    }

    fn check_scopes(&self, scopes: &[Scope]) -> Result<CapacityResult> {
        let mut blocking = Vec::new();
        for scope in scopes {
            let record = self.store.get(scope)?.ok_or(Error::UnknownScope(*scope))?;
            if record.is_at_limit() {
                blocking.push(record);
            }
        }
        Ok(CapacityResult::from_blocking(&blocking))
    }

    /// Atomically re-checks capacity and applies a move's counter changes.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope is unknown, a counter would underflow, or
    /// the store fails. Nothing is applied on error.
    pub fn commit_move(&self, pod: Option<Pod>, from: Gate, to: Gate) -> Result<CapacityResult> {
        self.apply(&move_plan(pod, from, to))
    }

    /// Atomically re-checks the newly entered scopes and applies a pod
    /// change within `gate`.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope is unknown, a counter would underflow, or
    /// the store fails. Nothing is applied on error.
    pub fn commit_pod_change(
        &self,
        from_pod: Option<Pod>,
        to_pod: Option<Pod>,
        gate: Gate,
    ) -> Result<CapacityResult> {
        self.apply(&pod_change_plan(from_pod, to_pod, gate))
    }

    /// Unconditionally reverts a plan that was committed earlier.
    ///
    /// # Errors
    ///
    /// Returns an error if a counter would underflow or the store fails.
    pub fn revert(&self, plan: &CounterPlan) -> Result<()> {
        let undo = inverse_plan(plan);
        if undo.is_empty() {
            return Ok(());
        }
        self.store.commit(&undo)?;
        tracing::warn!(scopes = undo.deltas.len(), "counter changes reverted");
        Ok(())
    }

    /// Atomically checks and counts an item entering `gate` from nowhere.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope is unknown or the store fails.
    pub fn commit_entry(&self, pod: Option<Pod>, gate: Gate) -> Result<CapacityResult> {
        self.apply(&entry_plan(pod, gate))
    }

    fn apply(&self, plan: &CounterPlan) -> Result<CapacityResult> {
        if plan.is_empty() {
            return Ok(CapacityResult::clear());
        }

        match self.store.commit(plan)? {
            CommitOutcome::Applied(records) => {
                for record in &records {
                    tracing::debug!(
                        scope = %record.scope,
                        current = record.current,
                        limit = record.limit,
                        "counter committed"
                    );
                }
                Ok(CapacityResult::clear())
            }
            CommitOutcome::Blocked(blocking) => Ok(CapacityResult::from_blocking(&blocking)),
        }
    }

    /// Reports utilization for every scope matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn utilization(&self, filter: &LimitFilter) -> Result<Vec<Utilization>> {
        Ok(self
            .store
            .list(filter)?
            .iter()
            .map(Utilization::from)
            .collect())
    }
}
