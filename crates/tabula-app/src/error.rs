// Rust guideline compliant 2026-02-09

//! Error handling for Tabula application services.

use serde::Serialize;
use tabula_core::Error as CoreError;
use thiserror::Error;

/// Result type alias for application-level operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Status marker for errors caused by the caller's input.
pub const STATUS_INPUT: u16 = 400;

/// Status marker for unexpected failures.
pub const STATUS_UNEXPECTED: u16 = 500;

/// Stable error codes for operation responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The requested entity was not found.
    NotFound,
    /// The request included invalid inputs.
    InvalidInput,
    /// The operation name is not known.
    UnknownOperation,
    /// A bulk update changed nothing.
    UpdateFailed,
    /// The listing definition is invalid.
    InvalidDefinition,
    /// The engine configuration is invalid.
    InvalidConfig,
    /// The request deadline passed.
    DeadlineExceeded,
    /// The catalog, workflow or data manager failed.
    UpstreamError,
    /// IO failure while reading or writing data.
    IoError,
    /// JSON serialization or parsing failed.
    JsonError,
}

/// Application-level errors with stable mapping to error codes.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input was provided by the caller.
    #[error("{0}")]
    InvalidInput(String),

    /// The operation name is not known.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    /// A referenced entity does not exist.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// A bulk update changed nothing.
    #[error("{0}")]
    UpdateFailed(String),

    /// Error from core library operations.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AppError {
    /// Builds the error for payloads lacking required keys.
    #[must_use]
    pub fn missing_keys(required: &[&str]) -> Self {
        AppError::InvalidInput(format!(
            "Payload needs to provide the keys {}",
            required.join(", ")
        ))
    }

    /// Returns a stable error code for the error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidInput(_) => ErrorCode::InvalidInput,
            AppError::UnknownOperation(_) => ErrorCode::UnknownOperation,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::UpdateFailed(_) => ErrorCode::UpdateFailed,
            AppError::Core(core) => match core {
                CoreError::NotFound(_) => ErrorCode::NotFound,
                CoreError::InvalidDefinition(_) => ErrorCode::InvalidDefinition,
                CoreError::InvalidConfig(_) => ErrorCode::InvalidConfig,
                CoreError::DeadlineExceeded(_) => ErrorCode::DeadlineExceeded,
                CoreError::Catalog(_) | CoreError::Workflow(_) | CoreError::DataManager(_) => {
                    ErrorCode::UpstreamError
                }
                CoreError::Io(_) => ErrorCode::IoError,
                CoreError::Json(_) => ErrorCode::JsonError,
            },
        }
    }

    /// Returns the status marker: 400 for caller input errors, 500 otherwise.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self.code() {
            ErrorCode::InvalidInput | ErrorCode::UnknownOperation | ErrorCode::NotFound => {
                STATUS_INPUT
            }
            _ => STATUS_UNEXPECTED,
        }
    }

    /// Returns the severity level shown to the user.
    #[must_use]
    pub fn level(&self) -> &'static str {
        if self.status() == STATUS_INPUT {
            "warning"
        } else {
            "error"
        }
    }

    /// Returns structured details for errors that benefit from extra context.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Core(CoreError::DeadlineExceeded(elapsed_ms)) => Some(serde_json::json!({
                "elapsed_ms": elapsed_ms,
            })),
            AppError::Core(CoreError::NotFound(uid)) | AppError::NotFound(uid) => {
                Some(serde_json::json!({ "uid": uid }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_400() {
        let error = AppError::missing_keys(&["save_queue"]);
        assert_eq!(error.status(), 400);
        assert_eq!(error.level(), "warning");
        assert_eq!(error.to_string(), "Payload needs to provide the keys save_queue");
    }

    #[test]
    fn test_upstream_errors_are_500() {
        let error = AppError::from(CoreError::Catalog("down".to_string()));
        assert_eq!(error.code(), ErrorCode::UpstreamError);
        assert_eq!(error.status(), 500);
        assert_eq!(error.level(), "error");
    }

    #[test]
    fn test_deadline_details() {
        let error = AppError::from(CoreError::DeadlineExceeded(1200));
        assert_eq!(error.details(), Some(serde_json::json!({"elapsed_ms": 1200})));
    }
}
