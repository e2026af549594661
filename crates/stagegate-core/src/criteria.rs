// Rust guideline compliant 2026-10-12

//! Named criteria evaluated against an item's recorded facts.
//!
//! Every criterion referenced by the gate catalog must have a rule. An
//! unknown name is a configuration fault: it is logged and returned as
//! [`Error::UnknownCriterion`], never treated as satisfied.

use crate::{Error, GateCatalog, Item, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a criterion is decided from item facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// The fact is boolean `true`.
    Flag {
        /// Fact key.
        key: String,
    },
    /// The fact exists and is non-empty.
    Present {
        /// Fact key.
        key: String,
    },
    /// The fact is a number greater than or equal to `min`.
    AtLeast {
        /// Fact key.
        key: String,
        /// Inclusive lower bound.
        min: f64,
    },
    /// The item has an owning pod.
    PodAssigned,
}

impl Rule {
    /// Shorthand for a flag rule keyed by the criterion name itself.
    pub fn flag(key: impl Into<String>) -> Self {
        Rule::Flag { key: key.into() }
    }

    /// Shorthand for a presence rule.
    pub fn present(key: impl Into<String>) -> Self {
        Rule::Present { key: key.into() }
    }

    /// Shorthand for a threshold rule.
    pub fn at_least(key: impl Into<String>, min: f64) -> Self {
        Rule::AtLeast {
            key: key.into(),
            min,
        }
    }

    fn holds(&self, item: &Item) -> bool {
        match self {
            Rule::Flag { key } => matches!(item.facts.get(key), Some(serde_json::Value::Bool(true))),
            Rule::Present { key } => item.facts.get(key).is_some_and(is_present),
            Rule::AtLeast { key, min } => item
                .facts
                .get(key)
                .and_then(serde_json::Value::as_f64)
                .is_some_and(|value| value >= *min),
            Rule::PodAssigned => item.pod.is_some(),
        }
    }
}

fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(flag) => *flag,
        serde_json::Value::Number(_) => true,
        serde_json::Value::String(text) => !text.trim().is_empty(),
        serde_json::Value::Array(values) => !values.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
    }
}

/// Evaluates criteria by name.
#[derive(Debug, Clone)]
pub struct CriteriaEvaluator {
    rules: BTreeMap<String, Rule>,
}

impl CriteriaEvaluator {
    /// Creates an evaluator with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Creates an evaluator covering every criterion of the standard catalog.
    #[must_use]
    pub fn standard() -> Self {
        let mut evaluator = Self::empty();
        evaluator.register("problem_statement_exists", Rule::present("problem_statement"));
        evaluator.register("hypothesis_defined", Rule::present("hypothesis"));
        evaluator.register("strategic_fit_score_gte_3", Rule::at_least("strategic_fit", 3.0));
        evaluator.register("impact_score_gte_3", Rule::at_least("impact", 3.0));
        evaluator.register("owner_assigned", Rule::present("owner"));
        evaluator.register("pod_identified", Rule::PodAssigned);
        evaluator.register("test_coverage_60_percent", Rule::at_least("test_coverage", 60.0));
        evaluator.register("stability_period_30_days", Rule::at_least("stability_days", 30.0));

        // Everything else is a reviewer-recorded boolean under its own name
        for name in GateCatalog::standard().criterion_names() {
            if !evaluator.knows(name) {
                evaluator.register(name, Rule::flag(name));
            }
        }
        evaluator
    }

    /// Registers or replaces the rule for `name`.
    pub fn register(&mut self, name: impl Into<String>, rule: Rule) {
        self.rules.insert(name.into(), rule);
    }

    /// Returns this evaluator extended with `rules`, replacing same-named entries.
    #[must_use]
    pub fn with_rules(mut self, rules: &BTreeMap<String, Rule>) -> Self {
        for (name, rule) in rules {
            self.register(name.clone(), rule.clone());
        }
        self
    }

    /// Returns true if a rule exists for `name`.
    #[must_use]
    pub fn knows(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Evaluates `name` against the item's facts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCriterion`] if no rule is registered for `name`.
    pub fn evaluate(&self, item: &Item, name: &str) -> Result<bool> {
        match self.rules.get(name) {
            Some(rule) => Ok(rule.holds(item)),
            None => {
                tracing::error!(criterion = name, item = %item.id, "unknown criterion");
                Err(Error::UnknownCriterion(name.to_string()))
            }
        }
    }

    /// Confirms every criterion the catalog references has a rule.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming every unimplemented criterion.
    pub fn verify_catalog(&self, catalog: &GateCatalog) -> Result<()> {
        let missing: Vec<&str> = catalog
            .criterion_names()
            .into_iter()
            .filter(|name| !self.knows(name))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "Catalog references unimplemented criteria: {}",
                missing.join(", ")
            )))
        }
    }
}

impl Default for CriteriaEvaluator {
    fn default() -> Self {
        Self::standard()
    }
}
