//! Structured error types for cellsync.
//!
//! Only the backing store and JSON loading can fail. The projection and
//! synchronization paths degrade to no-ops instead of returning errors.

use crate::types::RowKey;

/// All errors that can occur in cellsync.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// JSON (de)serialization error from serde_json.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The row key is not present in the backing store.
    #[error("Row not found: {0}")]
    RowNotFound(RowKey),

    /// A row with this key is already loaded.
    #[error("Duplicate row key: {0}")]
    DuplicateRowKey(RowKey),

    /// A merge request that cannot describe a span group.
    #[error("Invalid span for column {column}: {reason}")]
    InvalidSpan { column: String, reason: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;
