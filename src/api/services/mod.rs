//! Services module - contains the validation and ingestion business logic.

pub mod form_validator;
pub mod submission_service;
pub mod submission_validator;

// Re-export for convenience
pub use form_validator::{DefinitionError, validate_form_definition};
pub use submission_service::{SubmissionError, SubmissionReceipt, SubmissionService};
pub use submission_validator::{ValidationError, validate_submission};
