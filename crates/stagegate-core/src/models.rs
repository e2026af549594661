// Rust guideline compliant 2026-10-12

//! Core data models for Stagegate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A stage in the maturity pipeline.
///
/// The five active gates are totally ordered. `Killed` and `Parked` are
/// terminal sentinels with no ordinal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gate {
    /// Idea capture and qualification.
    Spark,
    /// Feasibility validation and planning.
    Seed,
    /// Build core functionality.
    Scaffold,
    /// Polish and production release.
    Ship,
    /// Optimize and expand.
    Scale,
    /// Stopped for good. Absorbing.
    Killed,
    /// Shelved; may be resurrected into any active gate.
    Parked,
}

impl Gate {
    /// Every gate, active gates first in pipeline order.
    pub const ALL: [Gate; 7] = [
        Gate::Spark,
        Gate::Seed,
        Gate::Scaffold,
        Gate::Ship,
        Gate::Scale,
        Gate::Killed,
        Gate::Parked,
    ];

    /// The active gates in pipeline order.
    pub const ACTIVE: [Gate; 5] = [
        Gate::Spark,
        Gate::Seed,
        Gate::Scaffold,
        Gate::Ship,
        Gate::Scale,
    ];

    /// Returns the pipeline position, or `None` for terminal gates.
    #[must_use]
    pub fn ordinal(self) -> Option<u8> {
        match self {
            Gate::Spark => Some(0),
            Gate::Seed => Some(1),
            Gate::Scaffold => Some(2),
            Gate::Ship => Some(3),
            Gate::Scale => Some(4),
            Gate::Killed | Gate::Parked => None,
        }
    }

    /// Returns the active gate at the given position.
    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Gate> {
        Gate::ACTIVE.get(usize::from(ordinal)).copied()
    }

    /// Returns true for `Killed` and `Parked`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.ordinal().is_none()
    }

    /// Canonical upper-case name, as persisted.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gate::Spark => "SPARK",
            Gate::Seed => "SEED",
            Gate::Scaffold => "SCAFFOLD",
            Gate::Ship => "SHIP",
            Gate::Scale => "SCALE",
            Gate::Killed => "KILLED",
            Gate::Parked => "PARKED",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gate {
    type Err = crate::Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        Gate::ALL
            .into_iter()
            .find(|gate| gate.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| crate::Error::InvalidItem(format!("Unknown gate: {}", value)))
    }
}

/// A delivery team owning items.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pod {
    CrownTrophy,
    Paintbox,
    PromoterOs,
    Ratio,
    Platform,
}

impl Pod {
    /// Every pod.
    pub const ALL: [Pod; 5] = [
        Pod::CrownTrophy,
        Pod::Paintbox,
        Pod::PromoterOs,
        Pod::Ratio,
        Pod::Platform,
    ];

    /// Canonical upper-case name, as persisted.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Pod::CrownTrophy => "CROWN_TROPHY",
            Pod::Paintbox => "PAINTBOX",
            Pod::PromoterOs => "PROMOTER_OS",
            Pod::Ratio => "RATIO",
            Pod::Platform => "PLATFORM",
        }
    }
}

impl fmt::Display for Pod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pod {
    type Err = crate::Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        let normalized = value.trim().replace('-', "_");
        Pod::ALL
            .into_iter()
            .find(|pod| pod.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| crate::Error::InvalidItem(format!("Unknown pod: {}", value)))
    }
}

/// An idea or project moving through the gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique hash-based identifier (format: idea-XXXXXX).
    pub id: String,
    /// One-line summary.
    pub title: String,
    /// Current gate. Only the transition engine changes this.
    pub gate: Gate,
    /// Owning pod, if assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<Pod>,
    /// Recorded facts consulted by criteria (scores, flags, statements).
    #[serde(default)]
    pub facts: BTreeMap<String, serde_json::Value>,
    /// Author identifier.
    pub author: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp of the next scheduled gate review.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review: Option<i64>,
}

impl Item {
    /// Creates a new item at the first gate.
    ///
    /// # Arguments
    ///
    /// * `title` - The item title
    /// * `author` - The author identifier
    pub fn new(title: String, author: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        let id = crate::identity::generate_id(&title, &author, now, 0);

        Self {
            id,
            title,
            gate: Gate::Spark,
            pod: None,
            facts: BTreeMap::new(),
            author,
            created_at: now,
            updated_at: now,
            next_review: None,
        }
    }

    /// Records a fact, replacing any previous value.
    pub fn set_fact(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.facts.insert(key.into(), value.into());
    }

    /// Returns true if the item is in an active (non-terminal) gate.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.gate.is_terminal()
    }

    /// Validates the item data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Title is empty
    /// - Author is empty
    /// - ID format is invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.title.trim().is_empty() {
            return Err(crate::Error::InvalidItem(
                "Title cannot be empty".to_string(),
            ));
        }

        if self.author.trim().is_empty() {
            return Err(crate::Error::InvalidItem(
                "Author cannot be empty".to_string(),
            ));
        }

        crate::identity::validate_id_format(&self.id)
    }
}

/// Whether a transition attempt was approved or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Approved,
    Rejected,
}

/// Which side of a gate a criterion guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionPhase {
    /// Must hold to enter the gate.
    Entry,
    /// Must hold to leave the gate.
    Exit,
}

impl fmt::Display for CriterionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriterionPhase::Entry => f.write_str("entry"),
            CriterionPhase::Exit => f.write_str("exit"),
        }
    }
}

/// A single evaluated criterion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionResult {
    /// Criterion name.
    pub name: String,
    /// Gate whose configuration lists the criterion.
    pub gate: Gate,
    /// Entry or exit.
    pub phase: CriterionPhase,
    /// Evaluation result.
    pub passed: bool,
}

/// Immutable fact describing one transition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Unique hash-based identifier (format: trn-XXXXXX).
    pub id: String,
    /// Item the attempt applied to.
    pub item_id: String,
    /// Gate before the attempt.
    pub from: Gate,
    /// Requested gate. Equals `from` for review rejections.
    pub to: Gate,
    /// Who performed the attempt.
    pub actor: String,
    /// Unix timestamp of the attempt.
    pub timestamp: i64,
    /// Approved or rejected.
    pub outcome: Outcome,
    /// Whether criteria checks were bypassed.
    #[serde(default)]
    pub overridden: bool,
    /// Reviewer comments or rejection reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Criteria evaluated during the attempt.
    #[serde(default)]
    pub criteria: Vec<CriterionResult>,
}
