// Rust guideline compliant 2026-10-14

//! Single entry point for gate changes.
//!
//! [`GateTransitionEngine`] validates a move, enforces WIP limits and commits
//! the counter changes. The capacity guard and the counter update are one
//! [`LimitStore::commit`], so racing promotions can never overshoot a limit.
//! The engine does not persist items or records; callers store what it
//! returns.

use crate::limits::LimitStore;
use crate::validator::{Failure, FailureKind, TransitionValidator, ValidationResult};
use crate::wip::{CapacityResult, WipEnforcer};
use crate::{
    CriteriaEvaluator, Error, Gate, GateCatalog, Item, Outcome, Pod, Result, TransitionRecord,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Options for [`GateTransitionEngine::promote`].
#[derive(Debug, Clone, Default)]
pub struct PromoteOptions {
    /// Skip criteria checks. Sequencing and capacity still apply.
    pub override_checks: bool,
    /// Reviewer comments stored on the record.
    pub comments: Option<String>,
}

/// A refused promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Every reason the move was refused.
    pub failures: Vec<Failure>,
    /// Audit record of the attempt.
    pub record: TransitionRecord,
}

impl Rejection {
    /// Failure messages in reporting order.
    pub fn messages(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.message.as_str()).collect()
    }

    /// Returns true if any failure has the given kind.
    #[must_use]
    pub fn has_kind(&self, kind: FailureKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }
}

/// Result of [`GateTransitionEngine::promote`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromotionOutcome {
    /// The item moved and counters were updated.
    Approved {
        /// Item in its new gate.
        item: Item,
        /// Audit record of the move.
        record: TransitionRecord,
    },
    /// Nothing changed.
    Rejected(Rejection),
}

impl PromotionOutcome {
    /// Returns true for an approved move.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, PromotionOutcome::Approved { .. })
    }

    /// Returns the audit record regardless of outcome.
    pub fn record(&self) -> &TransitionRecord {
        match self {
            PromotionOutcome::Approved { record, .. } => record,
            PromotionOutcome::Rejected(rejection) => &rejection.record,
        }
    }
}

/// Dry-run report for a prospective promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    /// Item inspected.
    pub item_id: String,
    /// Current gate.
    pub from: Gate,
    /// Requested gate.
    pub to: Gate,
    /// Sequencing and criteria outcome.
    pub validation: ValidationResult,
    /// Capacity outcome at the time of the preview.
    pub capacity: CapacityResult,
}

impl Preview {
    /// Returns true if a promotion would currently succeed.
    #[must_use]
    pub fn would_pass(&self) -> bool {
        self.validation.legal && self.capacity.ok
    }
}

/// Result of [`GateTransitionEngine::reassign_pod`].
#[derive(Debug, Clone, PartialEq)]
pub enum PodChange {
    /// Occupancy moved to the new pod.
    Moved(Item),
    /// The new pod's scope is full; nothing changed.
    Blocked(CapacityResult),
}

/// Orchestrates validation, WIP enforcement and counter commits.
pub struct GateTransitionEngine<S: ?Sized> {
    catalog: Arc<GateCatalog>,
    validator: TransitionValidator,
    wip: WipEnforcer<S>,
    sequence: AtomicU64,
}

impl<S: LimitStore + ?Sized> GateTransitionEngine<S> {
    /// Wires the engine from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the catalog references a criterion
    /// the evaluator does not implement.
    pub fn new(
        catalog: Arc<GateCatalog>,
        evaluator: Arc<CriteriaEvaluator>,
        store: Arc<S>,
    ) -> Result<Self> {
        let validator = TransitionValidator::new(Arc::clone(&catalog), evaluator)?;
        Ok(Self {
            catalog,
            validator,
            wip: WipEnforcer::new(store),
            // Record IDs must stay unique across processes, not just within one
            sequence: AtomicU64::new(u64::from(chrono::Utc::now().timestamp_subsec_nanos())),
        })
    }

    /// Returns the gate catalog.
    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    /// Returns the WIP enforcer.
    pub fn wip(&self) -> &WipEnforcer<S> {
        &self.wip
    }

    /// Promotes `item` to `target` at the current time.
    ///
    /// # Errors
    ///
    /// See [`GateTransitionEngine::promote_at`].
    pub fn promote(
        &self,
        item: &Item,
        target: Gate,
        actor: &str,
        options: &PromoteOptions,
    ) -> Result<PromotionOutcome> {
        self.promote_at(item, target, actor, options, chrono::Utc::now().timestamp())
    }

    /// Promotes `item` to `target` as of `now`.
    ///
    /// Sequencing and criteria failures, and full WIP scopes, are returned as
    /// [`PromotionOutcome::Rejected`] with nothing mutated.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The catalog or a criterion is misconfigured
    /// - A WIP scope was never initialized
    /// - The limit store fails
    ///
    /// No counter is changed on error.
    pub fn promote_at(
        &self,
        item: &Item,
        target: Gate,
        actor: &str,
        options: &PromoteOptions,
        now: i64,
    ) -> Result<PromotionOutcome> {
        let validation = self.validator.validate(item, target, options.override_checks)?;
        let next_review = self.catalog.config_for(target)?.next_review(now);

        let mut record = self.record(item, target, actor, now);
        record.overridden = options.override_checks;
        record.comments = options.comments.clone();
        record.criteria = validation.criteria;

        if !validation.legal {
            return Ok(self.rejected(record, validation.failures));
        }

        let capacity = self.wip.commit_move(item.pod, item.gate, target)?;
        if !capacity.ok {
            let failures = capacity
                .violations
                .into_iter()
                .map(|message| Failure::new(FailureKind::Capacity, message))
                .collect();
            return Ok(self.rejected(record, failures));
        }

        let mut moved = item.clone();
        if item.gate.ordinal().map(|o| o + 1) == target.ordinal() {
            moved.set_fact(
                format!("{}_gate_passed", item.gate.as_str().to_ascii_lowercase()),
                true,
            );
        }
        moved.gate = target;
        moved.next_review = next_review;
        moved.updated_at = now;

        record.outcome = Outcome::Approved;
        tracing::info!(
            item = %item.id,
            from = %item.gate,
            to = %target,
            actor,
            overridden = options.override_checks,
            "gate transition approved"
        );

        Ok(PromotionOutcome::Approved {
            item: moved,
            record,
        })
    }

    /// Records a review rejection on the item's current gate.
    ///
    /// Neither the gate nor any counter changes, so repeating the call is
    /// harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if `reason` is blank.
    pub fn reject(&self, item: &Item, reason: &str, actor: &str) -> Result<TransitionRecord> {
        self.reject_at(item, reason, actor, chrono::Utc::now().timestamp())
    }

    /// Records a review rejection as of `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if `reason` is blank.
    pub fn reject_at(
        &self,
        item: &Item,
        reason: &str,
        actor: &str,
        now: i64,
    ) -> Result<TransitionRecord> {
        if reason.trim().is_empty() {
            return Err(Error::InvalidItem(
                "Rejection reason cannot be empty".to_string(),
            ));
        }

        let mut record = self.record(item, item.gate, actor, now);
        record.comments = Some(reason.to_string());
        tracing::info!(item = %item.id, gate = %item.gate, actor, "review rejected");
        Ok(record)
    }

    /// Reports what a promotion would do without changing anything.
    ///
    /// Unlike [`promote`](Self::promote), capacity is reported even when
    /// validation fails, so callers get the complete remediation list.
    ///
    /// # Errors
    ///
    /// Returns the same configuration and store errors as `promote`.
    pub fn preview(&self, item: &Item, target: Gate, override_checks: bool) -> Result<Preview> {
        let validation = self.validator.validate(item, target, override_checks)?;
        let capacity = self.wip.check_capacity(item.pod, target)?;
        Ok(Preview {
            item_id: item.id.clone(),
            from: item.gate,
            to: target,
            validation,
            capacity,
        })
    }

    /// Counts a newly created item against the scopes of its gate.
    ///
    /// Returns the capacity result; when it is not ok nothing was counted and
    /// the item should not be stored. Terminal items occupy nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope is unknown or the store fails.
    pub fn admit(&self, item: &Item) -> Result<CapacityResult> {
        let capacity = self.wip.commit_entry(item.pod, item.gate)?;
        if capacity.ok {
            tracing::debug!(item = %item.id, gate = %item.gate, "item admitted");
        } else {
            tracing::warn!(item = %item.id, violations = ?capacity.violations, "admission refused");
        }
        Ok(capacity)
    }

    /// Moves `item` to another pod (or none), checking the new per-pod scope.
    ///
    /// # Errors
    ///
    /// Returns an error if a scope is unknown or the store fails.
    pub fn reassign_pod(&self, item: &Item, pod: Option<Pod>) -> Result<PodChange> {
        if item.pod == pod {
            return Ok(PodChange::Moved(item.clone()));
        }

        let capacity = self.wip.commit_pod_change(item.pod, pod, item.gate)?;
        if !capacity.ok {
            tracing::warn!(item = %item.id, violations = ?capacity.violations, "pod change refused");
            return Ok(PodChange::Blocked(capacity));
        }

        let mut moved = item.clone();
        moved.pod = pod;
        moved.updated_at = chrono::Utc::now().timestamp();
        tracing::info!(item = %item.id, from = ?item.pod, to = ?pod, "pod reassigned");
        Ok(PodChange::Moved(moved))
    }

    fn record(&self, item: &Item, target: Gate, actor: &str, now: i64) -> TransitionRecord {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        TransitionRecord {
            id: crate::identity::generate_record_id(&item.id, actor, now, sequence),
            item_id: item.id.clone(),
            from: item.gate,
            to: target,
            actor: actor.to_string(),
            timestamp: now,
            outcome: Outcome::Rejected,
            overridden: false,
            comments: None,
            criteria: Vec::new(),
        }
    }

    fn rejected(&self, record: TransitionRecord, failures: Vec<Failure>) -> PromotionOutcome {
        tracing::warn!(
            item = %record.item_id,
            from = %record.from,
            to = %record.to,
            failures = failures.len(),
            "gate transition rejected"
        );
        PromotionOutcome::Rejected(Rejection { failures, record })
    }
}
