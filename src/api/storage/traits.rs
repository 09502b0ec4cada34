//! Storage trait definitions for the API storage backends.

use crate::models::{Form, Submission};
use uuid::Uuid;

/// Storage backend trait for form and submission persistence.
///
/// The store is the sole arbiter of consistency for the shared mutable Form
/// record: every multi-field mutation is a single write, and the submission
/// counter is only moved through the conditional claim/release primitives.
#[async_trait::async_trait]
pub trait FormStore: Send + Sync {
    /// Persist a new form
    async fn create_form(&self, form: Form) -> Result<Form, super::StorageError>;

    /// List all forms, newest first
    async fn list_forms(&self) -> Result<Vec<Form>, super::StorageError>;

    /// Get a form by id
    async fn get_form(&self, form_id: Uuid) -> Result<Option<Form>, super::StorageError>;

    /// Replace a form record in a single write
    async fn update_form(&self, form: Form) -> Result<Form, super::StorageError>;

    /// Delete a form, returning the deleted record if it existed.
    ///
    /// Deletion does not cascade to the form's submissions; orphaned
    /// submissions are left in place.
    async fn delete_form(&self, form_id: Uuid) -> Result<Option<Form>, super::StorageError>;

    /// Persist a new submission
    async fn create_submission(
        &self,
        submission: Submission,
    ) -> Result<Submission, super::StorageError>;

    /// List a form's submissions, newest first
    async fn list_submissions(&self, form_id: Uuid)
    -> Result<Vec<Submission>, super::StorageError>;

    /// Get a submission by (form id, submission id) composite key
    async fn get_submission(
        &self,
        form_id: Uuid,
        submission_id: Uuid,
    ) -> Result<Option<Submission>, super::StorageError>;

    /// Delete a submission by composite key, returning it if it existed
    async fn delete_submission(
        &self,
        form_id: Uuid,
        submission_id: Uuid,
    ) -> Result<Option<Submission>, super::StorageError>;

    /// Increment the form's submission counter, but only if it is still
    /// below the form's submission limit. Returns the new count.
    ///
    /// This is the compare-and-swap that makes limit enforcement exact under
    /// concurrent submissions; callers must not check-then-increment.
    async fn claim_submission_slot(&self, form_id: Uuid) -> Result<u32, super::StorageError>;

    /// Decrement the form's submission counter, floored at zero. Returns the
    /// new count.
    async fn release_submission_slot(&self, form_id: Uuid) -> Result<u32, super::StorageError>;
}
