// Rust guideline compliant 2026-10-14

//! Stagegate Core Library
//!
//! This crate provides the gate transition and WIP enforcement engine:
//! - Data models (Item, Gate, Pod, TransitionRecord)
//! - Gate catalog and criteria evaluation
//! - Sequencing rules and transition validation
//! - WIP counters (in-memory and file-backed stores) and enforcement
//! - The transition engine tying them together
//! - JSONL storage, configuration, and error types

pub mod catalog;
pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod file_store;
pub mod fsm;
pub mod identity;
pub mod limits;
pub mod memory_store;
pub mod models;
pub mod storage;
pub mod validator;
pub mod wip;

pub use catalog::{GateCatalog, GateConfig};
pub use config::{Config, OutputFormat, WipConfig};
pub use criteria::{CriteriaEvaluator, Rule};
pub use engine::{GateTransitionEngine, PodChange, Preview, PromoteOptions, PromotionOutcome, Rejection};
pub use error::{Error, Result};
pub use file_store::FileLimitStore;
pub use limits::{
    occupied_scopes, CommitOutcome, CounterPlan, Drift, LimitFilter, LimitRecord, LimitStore,
    Scope, ScopeKind, WipDefaults,
};
pub use memory_store::MemoryLimitStore;
pub use models::{CriterionPhase, CriterionResult, Gate, Item, Outcome, Pod, TransitionRecord};
pub use storage::{Record, Storage};
pub use validator::{Failure, FailureKind, TransitionValidator, ValidationResult};
pub use wip::{expected_counts, CapacityResult, Utilization, WipEnforcer};
