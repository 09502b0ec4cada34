//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state:
//! the form store, the submission service, the staged-upload directory and
//! the submission rate limiter.

use crate::middleware::rate_limit::{
    SUBMISSIONS_PER_MINUTE, SharedRateLimiter, create_rate_limiter,
};
use crate::services::SubmissionService;
use crate::storage::{FormStore, InMemoryFormStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Form/submission document store
    pub store: Arc<dyn FormStore>,
    /// Submission ingestion pipeline
    pub submissions: SubmissionService,
    /// Directory for files staged by multipart uploads
    pub upload_dir: PathBuf,
    /// Rate limiter for the public submission endpoint
    pub submission_limiter: SharedRateLimiter,
}

impl AppState {
    /// Create a new application state with the in-memory store and the
    /// upload directory from `UPLOAD_DIR` (default `uploads`).
    pub fn new() -> Self {
        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));
        Self::with_store_and_upload_dir(Arc::new(InMemoryFormStore::new()), upload_dir)
    }

    /// Create application state over an explicit store and upload directory.
    /// Used by tests and by callers wiring a different storage backend.
    pub fn with_store_and_upload_dir(store: Arc<dyn FormStore>, upload_dir: PathBuf) -> Self {
        Self {
            submissions: SubmissionService::new(store.clone()),
            store,
            upload_dir,
            submission_limiter: create_rate_limiter(SUBMISSIONS_PER_MINUTE),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
