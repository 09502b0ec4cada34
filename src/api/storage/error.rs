//! Storage error types for the API storage backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// Conditional counter increment refused because the form is at its
    /// submission limit
    #[error("Submission limit reached for form {form_id}")]
    LimitReached { form_id: String },
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}
