// Rust guideline compliant 2026-10-12

//! Static per-gate configuration.
//!
//! The catalog is built once at startup and is read-only afterwards. A
//! catalog that does not describe every [`Gate`] is rejected at construction,
//! so a lookup miss at runtime always indicates a deployment fault.

use crate::{Error, Gate, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Configuration for a single gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// The gate described.
    pub gate: Gate,
    /// Display name.
    pub name: String,
    /// One-line purpose of the gate.
    pub description: String,
    /// Criteria that must hold to enter the gate.
    #[serde(default)]
    pub entry_criteria: Vec<String>,
    /// Criteria that must hold to leave the gate.
    #[serde(default)]
    pub exit_criteria: Vec<String>,
    /// Artifacts expected at review.
    #[serde(default)]
    pub required_artifacts: Vec<String>,
    /// Days until the next review after entering; `None` means no review.
    pub sla_days: Option<u32>,
}

impl GateConfig {
    /// Returns the gate's pipeline position, or `None` when terminal.
    #[must_use]
    pub fn ordinal(&self) -> Option<u8> {
        self.gate.ordinal()
    }

    /// Computes the next review timestamp for an item entering this gate at `now`.
    #[must_use]
    pub fn next_review(&self, now: i64) -> Option<i64> {
        self.sla_days
            .map(|days| now.saturating_add(i64::from(days) * SECONDS_PER_DAY))
    }
}

/// Lookup table from gate to configuration.
#[derive(Debug, Clone)]
pub struct GateCatalog {
    configs: BTreeMap<Gate, GateConfig>,
}

impl GateCatalog {
    /// Builds a catalog from explicit configs.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a gate is described twice, a gate is
    /// missing, or an SLA of zero days is configured.
    pub fn from_configs(configs: Vec<GateConfig>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for config in configs {
            if config.sla_days == Some(0) {
                return Err(Error::Config(format!(
                    "SLA for {} must be at least one day",
                    config.gate
                )));
            }
            let gate = config.gate;
            if map.insert(gate, config).is_some() {
                return Err(Error::Config(format!("Gate {} configured twice", gate)));
            }
        }

        let missing: Vec<String> = Gate::ALL
            .iter()
            .filter(|gate| !map.contains_key(*gate))
            .map(|gate| gate.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "Gate catalog is missing {}",
                missing.join(", ")
            )));
        }

        Ok(Self { configs: map })
    }

    /// The standard five-gate pipeline.
    #[must_use]
    pub fn standard() -> Self {
        let configs = standard_configs()
            .into_iter()
            .map(|config| (config.gate, config))
            .collect();
        Self { configs }
    }

    /// Returns a copy of this catalog with per-gate SLA days replaced.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if an override is zero or targets Killed.
    pub fn with_sla_overrides(&self, overrides: &BTreeMap<Gate, u32>) -> Result<Self> {
        let mut configs: Vec<GateConfig> = self.configs.values().cloned().collect();
        for config in &mut configs {
            if let Some(days) = overrides.get(&config.gate) {
                if config.gate == Gate::Killed {
                    return Err(Error::Config(
                        "KILLED items are never reviewed; remove its SLA".to_string(),
                    ));
                }
                config.sla_days = Some(*days);
            }
        }
        Self::from_configs(configs)
    }

    /// Looks up the configuration for `gate`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the gate is not described.
    pub fn config_for(&self, gate: Gate) -> Result<&GateConfig> {
        self.configs
            .get(&gate)
            .ok_or_else(|| Error::Config(format!("No configuration for gate {}", gate)))
    }

    /// Iterates gate configurations in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = &GateConfig> {
        self.configs.values()
    }

    /// Returns every criterion name referenced by any gate.
    #[must_use]
    pub fn criterion_names(&self) -> BTreeSet<&str> {
        self.configs
            .values()
            .flat_map(|config| config.entry_criteria.iter().chain(&config.exit_criteria))
            .map(String::as_str)
            .collect()
    }
}

impl Default for GateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn standard_configs() -> Vec<GateConfig> {
    vec![
        GateConfig {
            gate: Gate::Spark,
            name: "Spark".to_string(),
            description: "Idea capture and qualification".to_string(),
            entry_criteria: names(&[
                "problem_statement_exists",
                "hypothesis_defined",
                "idea_ledger_entry",
            ]),
            exit_criteria: names(&[
                "strategic_fit_score_gte_3",
                "impact_score_gte_3",
                "feasibility_check_completed",
            ]),
            required_artifacts: names(&["idea_ledger_entry", "initial_pov"]),
            sla_days: Some(7),
        },
        GateConfig {
            gate: Gate::Seed,
            name: "Seed".to_string(),
            description: "Feasibility validation and planning".to_string(),
            entry_criteria: names(&["spark_gate_passed", "owner_assigned", "pod_identified"]),
            exit_criteria: names(&[
                "technical_feasibility_proven",
                "dependencies_identified",
                "risk_assessment_completed",
            ]),
            required_artifacts: names(&["technical_spike", "dependency_map", "decision_memo"]),
            sla_days: Some(14),
        },
        GateConfig {
            gate: Gate::Scaffold,
            name: "Scaffold".to_string(),
            description: "Build core functionality".to_string(),
            entry_criteria: names(&[
                "seed_gate_passed",
                "acceptance_criteria_defined",
                "api_contracts_drafted",
            ]),
            exit_criteria: names(&[
                "core_features_complete",
                "test_coverage_60_percent",
                "demo_approved",
            ]),
            required_artifacts: names(&[
                "core_implementation",
                "test_suite",
                "api_documentation",
                "demo_recording",
            ]),
            sla_days: Some(21),
        },
        GateConfig {
            gate: Gate::Ship,
            name: "Ship".to_string(),
            description: "Polish and production release".to_string(),
            entry_criteria: names(&[
                "scaffold_gate_passed",
                "minimum_remarkable_checklist_started",
                "deployment_plan_exists",
            ]),
            exit_criteria: names(&[
                "production_deployed",
                "monitoring_active",
                "documentation_complete",
            ]),
            required_artifacts: names(&[
                "production_code",
                "minimum_remarkable_checklist",
                "release_notes",
                "support_runbook",
            ]),
            sla_days: Some(7),
        },
        GateConfig {
            gate: Gate::Scale,
            name: "Scale".to_string(),
            description: "Optimize and expand".to_string(),
            entry_criteria: names(&[
                "ship_gate_passed",
                "stability_period_30_days",
                "usage_metrics_baseline",
            ]),
            exit_criteria: names(&[
                "performance_targets_met",
                "operational_maturity_l2",
                "team_onboarded",
            ]),
            required_artifacts: names(&[
                "optimization_report",
                "scaling_plan",
                "operational_handoff",
            ]),
            sla_days: Some(90),
        },
        GateConfig {
            gate: Gate::Killed,
            name: "Killed".to_string(),
            description: "Stopped permanently".to_string(),
            entry_criteria: Vec::new(),
            exit_criteria: Vec::new(),
            required_artifacts: Vec::new(),
            sla_days: None,
        },
        GateConfig {
            gate: Gate::Parked,
            name: "Parked".to_string(),
            description: "Shelved pending capacity or new evidence".to_string(),
            entry_criteria: Vec::new(),
            exit_criteria: Vec::new(),
            required_artifacts: Vec::new(),
            sla_days: Some(30),
        },
    ]
}
