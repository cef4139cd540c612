// Rust guideline compliant 2026-02-06

//! Error types for the Tabula core library.

use thiserror::Error;

/// Result type alias for Tabula operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Tabula operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The catalog failed to answer a query.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// The workflow port failed for an entity.
    #[error("Workflow error: {0}")]
    Workflow(String),

    /// The data manager refused or failed a field write.
    #[error("Data manager error: {0}")]
    DataManager(String),

    /// Invalid listing definition (columns, review states, anchors).
    #[error("Invalid listing definition: {0}")]
    InvalidDefinition(String),

    /// Invalid engine configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Entity not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// The caller-supplied deadline expired before the query completed.
    #[error("Deadline exceeded after {0} ms")]
    DeadlineExceeded(u128),
}
