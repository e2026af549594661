// Rust guideline compliant 2026-10-15

//! Response envelopes for JSON command output.

use crate::error::{AppError, ErrorCode};
use serde::Serialize;

/// Success envelope wrapping a command result.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    /// Status indicator.
    pub status: &'static str,
    /// Result payload.
    pub result: T,
}

impl<T: Serialize> SuccessEnvelope<T> {
    /// Creates a new success envelope.
    #[must_use]
    pub fn new(result: T) -> Self {
        Self {
            status: "ok",
            result,
        }
    }

    /// Renders the envelope as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Core(stagegate_core::Error::Json(e)))
    }
}

/// Error envelope carrying a stable code.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Status indicator.
    pub status: &'static str,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Whether retrying later may succeed.
    pub retryable: bool,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// Creates a new error envelope from an application error.
    #[must_use]
    pub fn from_error(error: &AppError) -> Self {
        Self {
            status: "error",
            code: error.code(),
            message: error.to_string(),
            retryable: error.is_transient(),
            details: error.details(),
        }
    }
}
