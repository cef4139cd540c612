// Rust guideline compliant 2026-02-09

//! Response envelopes for operation outputs.

use crate::error::{AppError, ErrorCode};
use serde::Serialize;

/// Standard success envelope.
#[derive(Debug, Serialize)]
pub struct SuccessEnvelope<T> {
    /// Status indicator.
    pub status: &'static str,
    /// Result payload.
    pub result: T,
}

impl<T> SuccessEnvelope<T> {
    /// Creates a new success envelope.
    #[must_use]
    pub fn new(result: T) -> Self {
        Self { status: "ok", result }
    }
}

/// Standard error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Severity marker: 400 for caller errors, 500 for unexpected failures.
    pub status: u16,
    /// Severity level shown to the user.
    pub level: &'static str,
    /// Optional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// Creates a new error envelope from an application error.
    #[must_use]
    pub fn from_error(error: &AppError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
            status: error.status(),
            level: error.level(),
            details: error.details(),
        }
    }
}

/// Serializes an operation result into its envelope.
///
/// # Arguments
///
/// * `result` - Operation outcome
///
/// # Returns
///
/// The success or error envelope as JSON.
#[must_use]
pub fn envelope<T: Serialize>(result: &Result<T, AppError>) -> serde_json::Value {
    let value = match result {
        Ok(payload) => serde_json::to_value(SuccessEnvelope::new(payload)),
        Err(error) => serde_json::to_value(ErrorEnvelope::from_error(error)),
    };
    value.unwrap_or_else(|err| {
        serde_json::json!({
            "code": ErrorCode::JsonError,
            "message": err.to_string(),
            "status": 500,
            "level": "error",
        })
    })
}
