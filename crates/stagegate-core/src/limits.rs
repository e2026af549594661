// Rust guideline compliant 2026-10-13

//! WIP limit records and the counter store contract.
//!
//! A [`Scope`] selects which live items a counter tracks. Counters are
//! maintained incrementally by the transition engine through
//! [`LimitStore::commit`], which checks guards and applies every delta of a
//! [`CounterPlan`] as one atomic step.
//!
//! Scopes are initialized explicitly (see [`LimitStore::initialize`]).
//! Adjusting a scope that was never initialized is a configuration error;
//! there is no lazy creation and no implicit "very high" default limit.

use crate::{Error, Gate, Pod, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Granularity a WIP limit applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Scope {
    /// Items of one pod in one gate.
    PerPod {
        /// Owning pod.
        pod: Pod,
        /// Active gate.
        gate: Gate,
    },
    /// Items of every pod in one gate.
    CrossPod {
        /// Active gate.
        gate: Gate,
    },
    /// Every live item.
    Portfolio,
}

/// Scope discriminant, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    PerPod,
    CrossPod,
    Portfolio,
}

impl Scope {
    /// Returns the scope's discriminant.
    #[must_use]
    pub fn kind(&self) -> ScopeKind {
        match self {
            Scope::PerPod { .. } => ScopeKind::PerPod,
            Scope::CrossPod { .. } => ScopeKind::CrossPod,
            Scope::Portfolio => ScopeKind::Portfolio,
        }
    }

    /// Returns the gate selector, if any.
    #[must_use]
    pub fn gate(&self) -> Option<Gate> {
        match self {
            Scope::PerPod { gate, .. } | Scope::CrossPod { gate } => Some(*gate),
            Scope::Portfolio => None,
        }
    }

    /// Returns the pod selector, if any.
    #[must_use]
    pub fn pod(&self) -> Option<Pod> {
        match self {
            Scope::PerPod { pod, .. } => Some(*pod),
            Scope::CrossPod { .. } | Scope::Portfolio => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::PerPod { pod, gate } => write!(f, "per_pod {}/{}", pod, gate),
            Scope::CrossPod { gate } => write!(f, "cross_pod {}", gate),
            Scope::Portfolio => f.write_str("portfolio"),
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::PerPod => f.write_str("per_pod"),
            ScopeKind::CrossPod => f.write_str("cross_pod"),
            ScopeKind::Portfolio => f.write_str("portfolio"),
        }
    }
}

/// Scopes a live item occupies, in enforcement order.
///
/// Terminal gates occupy nothing. The per-pod scope is omitted when the
/// item has no pod.
#[must_use]
pub fn occupied_scopes(pod: Option<Pod>, gate: Gate) -> Vec<Scope> {
    if gate.is_terminal() {
        return Vec::new();
    }

    let mut scopes = Vec::with_capacity(3);
    if let Some(pod) = pod {
        scopes.push(Scope::PerPod { pod, gate });
    }
    scopes.push(Scope::CrossPod { gate });
    scopes.push(Scope::Portfolio);
    scopes
}

/// Counter and ceiling for one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRecord {
    /// Selector for the counted items.
    #[serde(flatten)]
    pub scope: Scope,
    /// Maximum occupancy.
    pub limit: u32,
    /// Live items currently matching the scope.
    pub current: u32,
    /// Derived: `current >= limit`.
    pub exceeded: bool,
    /// Unix timestamp of the last counter or limit change.
    pub last_updated: i64,
}

impl LimitRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new(scope: Scope, limit: u32, now: i64) -> Self {
        Self {
            scope,
            limit,
            current: 0,
            exceeded: limit == 0,
            last_updated: now,
        }
    }

    /// Returns true if one more item would overshoot the limit.
    #[must_use]
    pub fn is_at_limit(&self) -> bool {
        self.current >= self.limit
    }

    /// Occupancy as a percentage of the limit; zero when the limit is zero.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.limit) * 100.0
    }

    /// Replaces the limit and recomputes `exceeded`.
    pub fn set_limit(&mut self, limit: u32, now: i64) {
        self.limit = limit;
        self.touch(now);
    }

    /// Replaces the counter and recomputes `exceeded`.
    pub fn set_current(&mut self, current: u32, now: i64) {
        self.current = current;
        self.touch(now);
    }

    fn touch(&mut self, now: i64) {
        self.exceeded = self.is_at_limit();
        self.last_updated = now;
    }

    fn shifted(&self, delta: i64) -> Result<u32> {
        let next = i64::from(self.current) + delta;
        u32::try_from(next).map_err(|_| Error::CounterUnderflow {
            scope: self.scope,
            current: self.current,
            delta,
        })
    }
}

/// Selection criteria for [`LimitStore::list`]. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LimitFilter {
    /// Only this scope type.
    pub kind: Option<ScopeKind>,
    /// Only scopes selecting this gate.
    pub gate: Option<Gate>,
    /// Only scopes selecting this pod.
    pub pod: Option<Pod>,
    /// Only records at or above their limit.
    pub exceeded_only: bool,
}

impl LimitFilter {
    /// Returns true if `record` passes the filter.
    #[must_use]
    pub fn matches(&self, record: &LimitRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.scope.kind() != kind {
                return false;
            }
        }
        if let Some(gate) = self.gate {
            if record.scope.gate() != Some(gate) {
                return false;
            }
        }
        if let Some(pod) = self.pod {
            if record.scope.pod() != Some(pod) {
                return false;
            }
        }
        !self.exceeded_only || record.exceeded
    }
}

/// Limits used to initialize every scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipDefaults {
    /// Per-pod limit for each active gate, applied to every pod.
    pub per_pod: BTreeMap<Gate, u32>,
    /// Cross-pod limit for each active gate.
    pub cross_pod: BTreeMap<Gate, u32>,
    /// Portfolio-wide limit.
    pub portfolio: u32,
}

impl Default for WipDefaults {
    fn default() -> Self {
        Self {
            per_pod: BTreeMap::from([
                (Gate::Spark, 10),
                (Gate::Seed, 5),
                (Gate::Scaffold, 3),
                (Gate::Ship, 2),
                (Gate::Scale, 1),
            ]),
            cross_pod: BTreeMap::from([
                (Gate::Spark, 50),
                (Gate::Seed, 25),
                (Gate::Scaffold, 15),
                (Gate::Ship, 10),
                (Gate::Scale, 5),
            ]),
            portfolio: 100,
        }
    }
}

impl WipDefaults {
    /// Expands the defaults into one `(scope, limit)` pair per scope.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a terminal gate carries a limit or an
    /// active gate has none.
    pub fn scopes(&self) -> Result<Vec<(Scope, u32)>> {
        for (label, table) in [("per_pod", &self.per_pod), ("cross_pod", &self.cross_pod)] {
            if let Some(gate) = table.keys().find(|gate| gate.is_terminal()) {
                return Err(Error::Config(format!(
                    "{} limit configured for terminal gate {}",
                    label, gate
                )));
            }
            if let Some(gate) = Gate::ACTIVE.iter().find(|gate| !table.contains_key(*gate)) {
                return Err(Error::Config(format!(
                    "{} limit missing for gate {}",
                    label, gate
                )));
            }
        }

        let mut scopes = Vec::new();
        for pod in Pod::ALL {
            for (gate, limit) in &self.per_pod {
                scopes.push((Scope::PerPod { pod, gate: *gate }, *limit));
            }
        }
        for (gate, limit) in &self.cross_pod {
            scopes.push((Scope::CrossPod { gate: *gate }, *limit));
        }
        scopes.push((Scope::Portfolio, self.portfolio));
        Ok(scopes)
    }
}

/// Guards and deltas applied together by [`LimitStore::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterPlan {
    /// Scopes that must be below their limit before anything is applied.
    pub guards: Vec<Scope>,
    /// Signed counter adjustments.
    pub deltas: Vec<(Scope, i64)>,
}

impl CounterPlan {
    /// Returns true if the plan neither guards nor adjusts anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty() && self.deltas.is_empty()
    }

    /// Every scope the plan touches, guards first.
    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.guards
            .iter()
            .copied()
            .chain(self.deltas.iter().map(|(scope, _)| *scope))
    }
}

/// Result of [`LimitStore::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every delta was applied. Records reflect the new state, one per adjusted scope.
    Applied(Vec<LimitRecord>),
    /// At least one guard was at its limit; nothing was changed. Records are
    /// the blocking scopes in guard order.
    Blocked(Vec<LimitRecord>),
}

/// A counter that disagreed with the item set during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Drift {
    /// Affected scope.
    pub scope: Scope,
    /// Counter value before reconciliation.
    pub recorded: u32,
    /// Value derived from live items.
    pub expected: u32,
}

/// Storage for WIP counters.
///
/// Every mutating method is linearizable per scope key. `commit` holds every
/// scope it touches for the duration of the guard check and the update, so a
/// guard can never be invalidated between check and increment.
pub trait LimitStore: Send + Sync {
    /// Returns the record for `scope`, or `None` if it was never initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, scope: &Scope) -> Result<Option<LimitRecord>>;

    /// Returns every record matching `filter`, ordered by scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn list(&self, filter: &LimitFilter) -> Result<Vec<LimitRecord>>;

    /// Sets the limit for `scope`, creating the scope if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set_limit(&self, scope: &Scope, limit: u32) -> Result<LimitRecord>;

    /// Atomically checks the plan's guards and applies its deltas.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A scope in the plan was never initialized
    /// - A delta would underflow a counter
    /// - The store cannot be read or written
    ///
    /// On error nothing is applied.
    fn commit(&self, plan: &CounterPlan) -> Result<CommitOutcome>;

    /// Creates every scope described by `defaults` that does not exist yet.
    /// Existing records are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the defaults are invalid or the store cannot be written.
    fn initialize(&self, defaults: &WipDefaults) -> Result<usize>;

    /// Overwrites counters that differ from `expected`; scopes absent from
    /// `expected` are expected to be zero.
    ///
    /// # Errors
    ///
    /// Returns an error if `expected` names an unknown scope or the store
    /// cannot be written. On error nothing is changed.
    fn reconcile(&self, expected: &BTreeMap<Scope, u32>) -> Result<Vec<Drift>>;

    /// Atomically adds `delta` to the counter for `scope`.
    ///
    /// # Errors
    ///
    /// Returns an error if the scope is unknown, the counter would underflow,
    /// or the store fails.
    fn adjust(&self, scope: &Scope, delta: i64) -> Result<LimitRecord> {
        let plan = CounterPlan {
            guards: Vec::new(),
            deltas: vec![(*scope, delta)],
        };
        match self.commit(&plan)? {
            CommitOutcome::Applied(records) => records
                .into_iter()
                .next()
                .ok_or(Error::UnknownScope(*scope)),
            CommitOutcome::Blocked(_) => Err(Error::StoreUnavailable(format!(
                "unguarded adjustment of {} reported as blocked",
                scope
            ))),
        }
    }
}

/// Executes `plan` against already-locked records.
///
/// Shared by the store implementations; the caller holds whatever locks make
/// this atomic.
pub(crate) fn execute_plan(
    plan: &CounterPlan,
    records: &mut BTreeMap<Scope, &mut LimitRecord>,
    now: i64,
) -> Result<CommitOutcome> {
    if let Some(unknown) = plan.scopes().find(|scope| !records.contains_key(scope)) {
        return Err(Error::UnknownScope(unknown));
    }

    let blocked: Vec<LimitRecord> = plan
        .guards
        .iter()
        .filter_map(|scope| records.get(scope))
        .filter(|record| record.is_at_limit())
        .map(|record| (**record).clone())
        .collect();
    if !blocked.is_empty() {
        return Ok(CommitOutcome::Blocked(blocked));
    }

    let mut order: Vec<Scope> = Vec::new();
    let mut net: BTreeMap<Scope, i64> = BTreeMap::new();
    for (scope, delta) in &plan.deltas {
        if !net.contains_key(scope) {
            order.push(*scope);
        }
        *net.entry(*scope).or_insert(0) += delta;
    }

    // Validate every counter before touching any of them
    let mut updates = Vec::with_capacity(order.len());
    for scope in &order {
        let delta = net[scope];
        let next = records[scope].shifted(delta)?;
        updates.push((*scope, delta, next));
    }

    let mut applied = Vec::with_capacity(updates.len());
    for (scope, delta, next) in updates {
        if let Some(record) = records.get_mut(&scope) {
            if delta != 0 {
                record.set_current(next, now);
            }
            applied.push((**record).clone());
        }
    }

    Ok(CommitOutcome::Applied(applied))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        let per_pod = Scope::PerPod {
            pod: Pod::Platform,
            gate: Gate::Seed,
        };
        assert_eq!(per_pod.to_string(), "per_pod PLATFORM/SEED");
        assert_eq!(Scope::CrossPod { gate: Gate::Ship }.to_string(), "cross_pod SHIP");
        assert_eq!(Scope::Portfolio.to_string(), "portfolio");
    }

    #[test]
    fn test_record_persists_as_flat_row() {
        let record = LimitRecord::new(
            Scope::PerPod {
                pod: Pod::Ratio,
                gate: Gate::Scaffold,
            },
            3,
            1_700_000_000,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "per_pod");
        assert_eq!(json["pod"], "RATIO");
        assert_eq!(json["gate"], "SCAFFOLD");
        assert_eq!(json["limit"], 3);

        let back: LimitRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);

        let portfolio: LimitRecord = serde_json::from_str(
            r#"{"type":"portfolio","limit":100,"current":7,"exceeded":false,"last_updated":0}"#,
        )
        .unwrap();
        assert_eq!(portfolio.scope, Scope::Portfolio);
    }

    #[test]
    fn test_per_person_rows_are_rejected() {
        let row = r#"{"type":"per_person","limit":2,"current":0,"exceeded":false,"last_updated":0}"#;
        assert!(serde_json::from_str::<LimitRecord>(row).is_err());
    }

    #[test]
    fn test_occupied_scopes_order() {
        assert_eq!(
            occupied_scopes(Some(Pod::Platform), Gate::Seed),
            vec![
                Scope::PerPod {
                    pod: Pod::Platform,
                    gate: Gate::Seed
                },
                Scope::CrossPod { gate: Gate::Seed },
                Scope::Portfolio,
            ]
        );
        assert_eq!(occupied_scopes(None, Gate::Seed).len(), 2);
        assert!(occupied_scopes(Some(Pod::Platform), Gate::Parked).is_empty());
    }

    #[test]
    fn test_default_scopes_cover_every_pod_and_gate() {
        let scopes = WipDefaults::default().scopes().unwrap();
        assert_eq!(scopes.len(), Pod::ALL.len() * 5 + 5 + 1);
    }

    #[test]
    fn test_defaults_reject_terminal_limits() {
        let mut defaults = WipDefaults::default();
        defaults.cross_pod.insert(Gate::Killed, 999);
        assert!(defaults.scopes().is_err());
    }

    #[test]
    fn test_execute_plan_nets_deltas_and_rejects_underflow() {
        let mut portfolio = LimitRecord::new(Scope::Portfolio, 10, 0);
        portfolio.set_current(1, 0);
        let mut records = BTreeMap::from([(Scope::Portfolio, &mut portfolio)]);

        let plan = CounterPlan {
            guards: Vec::new(),
            deltas: vec![(Scope::Portfolio, -1), (Scope::Portfolio, 1)],
        };
        let outcome = execute_plan(&plan, &mut records, 5).unwrap();
        assert!(matches!(outcome, CommitOutcome::Applied(ref r) if r[0].current == 1));

        let underflow = CounterPlan {
            guards: Vec::new(),
            deltas: vec![(Scope::Portfolio, -2)],
        };
        assert!(matches!(
            execute_plan(&underflow, &mut records, 5),
            Err(Error::CounterUnderflow { .. })
        ));
        assert_eq!(records[&Scope::Portfolio].current, 1);
    }
}
