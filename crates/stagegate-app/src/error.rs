// Rust guideline compliant 2026-10-15

//! Error handling for Stagegate application services.

use serde::Serialize;
use stagegate_core::Error as CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for application-level operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Stable error codes for JSON responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The requested item was not found.
    NotFound,
    /// The provided identifier matched multiple items.
    AmbiguousId,
    /// The requested gate change is not allowed.
    InvalidTransition,
    /// Item validation failed.
    ValidationError,
    /// Gate catalog, criteria, WIP scopes or settings are misconfigured.
    ConfigError,
    /// A counter change would drop below zero.
    CounterUnderflow,
    /// The limit store could not be locked or reached.
    StoreUnavailable,
    /// IO failure while reading or writing repository data.
    IoError,
    /// The repository has not been initialized.
    RepoNotInitialized,
    /// The request included invalid inputs.
    InvalidInput,
    /// JSON serialization or parsing failed.
    JsonError,
}

/// Application-level errors with stable mapping to error codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Repository is missing or not initialized.
    #[error("Stagegate repository not initialized at {path}. Run 'sgate init' first.")]
    RepoNotInitialized {
        /// Path where `.stagegate` was expected.
        path: PathBuf,
    },

    /// Invalid input was provided by the caller.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from core library operations.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// IO error not represented by core errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Returns a stable error code for the error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::RepoNotInitialized { .. } => ErrorCode::RepoNotInitialized,
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::Io(_) => ErrorCode::IoError,
            AppError::Core(core) => match core {
                CoreError::NotFound(_) => ErrorCode::NotFound,
                CoreError::AmbiguousId(_, _) => ErrorCode::AmbiguousId,
                CoreError::InvalidTransition(_) => ErrorCode::InvalidTransition,
                CoreError::InvalidItem(_) => ErrorCode::ValidationError,
                CoreError::Config(_)
                | CoreError::UnknownCriterion(_)
                | CoreError::UnknownScope(_) => ErrorCode::ConfigError,
                CoreError::CounterUnderflow { .. } => ErrorCode::CounterUnderflow,
                CoreError::StoreUnavailable(_) => ErrorCode::StoreUnavailable,
                CoreError::Io(_) => ErrorCode::IoError,
                CoreError::Json(_) => ErrorCode::JsonError,
            },
        }
    }

    /// Returns structured details for errors that benefit from extra context.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::RepoNotInitialized { path } => Some(serde_json::json!({
                "path": path,
            })),
            AppError::InvalidInput(_) | AppError::Io(_) => None,
            AppError::Core(core) => match core {
                CoreError::AmbiguousId(partial, matches) => Some(serde_json::json!({
                    "partial": partial,
                    "matches": matches,
                })),
                CoreError::UnknownScope(scope) => Some(serde_json::json!({
                    "scope": scope,
                })),
                CoreError::UnknownCriterion(name) => Some(serde_json::json!({
                    "criterion": name,
                })),
                CoreError::CounterUnderflow {
                    scope,
                    current,
                    delta,
                } => Some(serde_json::json!({
                    "scope": scope,
                    "current": current,
                    "delta": delta,
                })),
                _ => None,
            },
        }
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Core(core) => core.is_transient(),
            AppError::Io(_) => true,
            AppError::RepoNotInitialized { .. } | AppError::InvalidInput(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagegate_core::{Gate, Scope};

    #[test]
    fn test_configuration_faults_share_a_code() {
        let errors = [
            AppError::from(CoreError::Config("bad".to_string())),
            AppError::from(CoreError::UnknownCriterion("vibes".to_string())),
            AppError::from(CoreError::UnknownScope(Scope::Portfolio)),
        ];
        for error in &errors {
            assert_eq!(error.code(), ErrorCode::ConfigError);
        }
    }

    #[test]
    fn test_underflow_details_carry_the_scope() {
        let error = AppError::from(CoreError::CounterUnderflow {
            scope: Scope::CrossPod { gate: Gate::Seed },
            current: 0,
            delta: -1,
        });
        assert_eq!(error.code(), ErrorCode::CounterUnderflow);
        let details = error.details().expect("details");
        assert_eq!(details["scope"]["type"], "cross_pod");
        assert_eq!(details["scope"]["gate"], "SEED");
        assert_eq!(details["delta"], -1);
    }

    #[test]
    fn test_codes_serialize_as_snake_case() {
        let json = serde_json::to_string(&ErrorCode::RepoNotInitialized).expect("serialize");
        assert_eq!(json, "\"repo_not_initialized\"");
    }

    #[test]
    fn test_store_unavailable_is_transient() {
        let error = AppError::from(CoreError::StoreUnavailable("locked".to_string()));
        assert_eq!(error.code(), ErrorCode::StoreUnavailable);
        assert!(error.is_transient());
        assert!(!AppError::InvalidInput("x".to_string()).is_transient());
    }
}
