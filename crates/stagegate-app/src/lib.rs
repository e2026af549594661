// Rust guideline compliant 2026-10-15

//! Shared application services for Stagegate.
//!
//! This crate provides reusable, non-CLI-specific helpers for repository
//! discovery, the on-disk workspace around the transition engine, list
//! filtering, counter recounts, gate metrics, and standardized response
//! envelopes.

pub mod error;
pub mod list;
pub mod metrics;
pub mod recount;
pub mod repo;
pub mod response;
pub mod time;
pub mod workspace;

pub use error::{AppError, ErrorCode, Result};
pub use list::{list_items, parse_gate, parse_pod, ListOptions};
pub use metrics::{gate_metrics, GateMetric};
pub use recount::count_occupancy;
pub use repo::RepoContext;
pub use response::{ErrorEnvelope, SuccessEnvelope};
pub use time::{format_timestamp, unix_timestamp};
pub use workspace::{scope_from_parts, Admission, NewItem, Workspace};
