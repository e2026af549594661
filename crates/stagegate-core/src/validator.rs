// Rust guideline compliant 2026-10-13

//! Structural and substantive legality of a gate move.

use crate::{
    CriteriaEvaluator, CriterionPhase, CriterionResult, Error, Gate, GateCatalog, Item, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Category of a rejected move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The pipeline does not allow the move.
    Sequencing,
    /// An entry or exit criterion is unmet.
    Criteria,
    /// A WIP scope is full.
    Capacity,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Sequencing => f.write_str("sequencing"),
            FailureKind::Criteria => f.write_str("criteria"),
            FailureKind::Capacity => f.write_str("capacity"),
        }
    }
}

/// One human-readable reason a move was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Category.
    pub kind: FailureKind,
    /// Message suitable for display.
    pub message: String,
}

impl Failure {
    /// Creates a failure of `kind` with a display message.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Outcome of [`TransitionValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// True if the move may proceed to capacity enforcement.
    pub legal: bool,
    /// Every reason the move is illegal.
    pub failures: Vec<Failure>,
    /// Every criterion evaluated, passed or not.
    pub criteria: Vec<CriterionResult>,
}

/// Decides whether an item may move to a target gate.
#[derive(Debug, Clone)]
pub struct TransitionValidator {
    catalog: Arc<GateCatalog>,
    evaluator: Arc<CriteriaEvaluator>,
}

impl TransitionValidator {
    /// Creates a validator, refusing catalogs that reference unknown criteria.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming every criterion without a rule.
    pub fn new(catalog: Arc<GateCatalog>, evaluator: Arc<CriteriaEvaluator>) -> Result<Self> {
        evaluator.verify_catalog(&catalog)?;
        Ok(Self { catalog, evaluator })
    }

    /// Returns the catalog used for criteria lookups.
    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    /// Validates moving `item` to `target`.
    ///
    /// Sequencing is always enforced. Unless `override_checks` is set, every
    /// entry criterion of `target` and every exit criterion of the current
    /// gate must pass; all unmet criteria are reported. Moves into KILLED or
    /// PARKED are never subject to criteria.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either gate is missing from the
    /// catalog or a criterion has no rule. These are never folded into the
    /// result.
    pub fn validate(
        &self,
        item: &Item,
        target: Gate,
        override_checks: bool,
    ) -> Result<ValidationResult> {
        let current_config = self.catalog.config_for(item.gate)?;
        let target_config = self.catalog.config_for(target)?;

        if let Err(error) = item.gate.can_transition_to(target) {
            let Error::InvalidTransition(message) = error else {
                return Err(error);
            };
            return Ok(ValidationResult {
                legal: false,
                failures: vec![Failure::new(FailureKind::Sequencing, message)],
                criteria: Vec::new(),
            });
        }

        if override_checks || target.is_terminal() {
            return Ok(ValidationResult {
                legal: true,
                failures: Vec::new(),
                criteria: Vec::new(),
            });
        }

        let checks = target_config
            .entry_criteria
            .iter()
            .map(|name| (name, target, CriterionPhase::Entry))
            .chain(
                current_config
                    .exit_criteria
                    .iter()
                    .map(|name| (name, item.gate, CriterionPhase::Exit)),
            );

        let mut criteria = Vec::new();
        let mut failures = Vec::new();
        for (name, gate, phase) in checks {
            let passed = self.evaluator.evaluate(item, name)?;
            if !passed {
                failures.push(Failure::new(
                    FailureKind::Criteria,
                    format!("{} criterion not met for {}: {}", phase, gate, name),
                ));
            }
            criteria.push(CriterionResult {
                name: name.clone(),
                gate,
                phase,
                passed,
            });
        }

        Ok(ValidationResult {
            legal: failures.is_empty(),
            failures,
            criteria,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pod;

    fn validator() -> TransitionValidator {
        TransitionValidator::new(
            Arc::new(GateCatalog::standard()),
            Arc::new(CriteriaEvaluator::standard()),
        )
        .unwrap()
    }

    fn ready_for_seed() -> Item {
        let mut item = Item::new("Self-serve onboarding".to_string(), "kai".to_string());
        item.pod = Some(Pod::Platform);
        item.set_fact("strategic_fit", 4);
        item.set_fact("impact", 3);
        item.set_fact("feasibility_check_completed", true);
        item.set_fact("spark_gate_passed", true);
        item.set_fact("owner", "kai");
        item
    }

    #[test]
    fn test_ready_item_passes() {
        let result = validator().validate(&ready_for_seed(), Gate::Seed, false).unwrap();
        assert!(result.legal, "{:?}", result.failures);
        assert_eq!(result.criteria.len(), 6);
        assert!(result.criteria.iter().all(|c| c.passed));
    }

    #[test]
    fn test_every_unmet_criterion_is_listed() {
        let mut item = ready_for_seed();
        item.facts.remove("owner");
        item.set_fact("impact", 1);

        let result = validator().validate(&item, Gate::Seed, false).unwrap();
        assert!(!result.legal);
        let messages: Vec<&str> = result.failures.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "entry criterion not met for SEED: owner_assigned",
                "exit criterion not met for SPARK: impact_score_gte_3",
            ]
        );
        assert!(result.failures.iter().all(|f| f.kind == FailureKind::Criteria));
    }

    #[test]
    fn test_override_skips_criteria_but_not_sequencing() {
        let item = Item::new("Bare".to_string(), "kai".to_string());
        assert!(validator().validate(&item, Gate::Seed, true).unwrap().legal);

        let skip = validator().validate(&item, Gate::Scaffold, true).unwrap();
        assert!(!skip.legal);
        assert_eq!(skip.failures[0].kind, FailureKind::Sequencing);
    }

    #[test]
    fn test_terminal_targets_ignore_criteria() {
        let mut item = Item::new("Bare".to_string(), "kai".to_string());
        item.gate = Gate::Ship;
        assert!(validator().validate(&item, Gate::Killed, false).unwrap().legal);
        assert!(validator().validate(&item, Gate::Parked, false).unwrap().legal);
    }

    #[test]
    fn test_killed_blocks_everything() {
        let mut item = ready_for_seed();
        item.gate = Gate::Killed;
        for target in Gate::ALL {
            let result = validator().validate(&item, target, true).unwrap();
            assert!(!result.legal, "KILLED -> {} accepted", target);
        }
    }

    #[test]
    fn test_failure_display_carries_kind() {
        let failure = Failure::new(FailureKind::Capacity, "portfolio at limit (100/100)");
        assert_eq!(failure.to_string(), "[capacity] portfolio at limit (100/100)");
    }
}
