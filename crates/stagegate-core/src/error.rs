// Rust guideline compliant 2026-10-12

//! Error types for the Stagegate core library.

use crate::limits::Scope;
use thiserror::Error;

/// Result type alias for Stagegate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Stagegate operations.
///
/// Rejections caused by sequencing, criteria or capacity are not errors; they
/// are returned as [`crate::engine::Rejection`] values. The variants here are
/// configuration faults, data faults and store failures.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The gate catalog or configuration is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A criterion name has no registered rule.
    #[error("Unknown criterion: {0}")]
    UnknownCriterion(String),

    /// A counter scope was used before being initialized.
    #[error("Unknown WIP scope: {0}")]
    UnknownScope(Scope),

    /// A decrement would drive a counter below zero.
    #[error("Counter underflow on {scope}: current {current}, delta {delta}")]
    CounterUnderflow {
        /// Scope whose counter would underflow.
        scope: Scope,
        /// Counter value at the time of the adjustment.
        current: u32,
        /// Requested adjustment.
        delta: i64,
    },

    /// Invalid item data.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Item not found.
    #[error("Item not found: {0}")]
    NotFound(String),

    /// Ambiguous partial ID.
    #[error("Ambiguous ID: {0} matches {1:?}")]
    AmbiguousId(String, Vec<String>),

    /// Invalid gate transition.
    #[error("Invalid gate transition: {0}")]
    InvalidTransition(String),

    /// The limit store could not be reached or locked.
    #[error("Limit store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    /// Returns true for deployment or configuration faults that must stop the process.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::UnknownCriterion(_) | Error::UnknownScope(_)
        )
    }

    /// Returns true for infrastructure failures where retrying the whole call is safe.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Io(_) | Error::StoreUnavailable(_))
    }
}
