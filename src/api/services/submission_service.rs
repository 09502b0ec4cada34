//! Submission ingestion pipeline.
//!
//! Orchestrates eligibility checks, file normalization, validation,
//! persistence and counter maintenance for one form submission. Limit
//! enforcement is authoritative at the store layer: the counter only moves
//! through the conditional claim, so two concurrent submissions racing for
//! the last slot cannot both win.

use crate::models::{FieldType, Form, FormStatus, Submission, UploadedFile};
use crate::services::submission_validator::{ValidationError, validate_submission};
use crate::storage::{FormStore, StorageError};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Inline payload keys of the remote upload channel: `file_<name>` carries
/// the object-storage URL, the others carry attachment metadata.
const FILE_KEY_PREFIX: &str = "file_";
const FILENAME_KEY_PREFIX: &str = "filename_";
const FILESIZE_KEY_PREFIX: &str = "filesize_";
const FILETYPE_KEY_PREFIX: &str = "filetype_";

const DEFAULT_ORIGINAL_NAME: &str = "uploaded_file";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Terminal result of a rejected submission operation.
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Form not found")]
    FormNotFound,
    #[error("Submission not found")]
    SubmissionNotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Accepted submission: the form's thank-you message plus the new record id.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub message: String,
    pub submission_id: Uuid,
}

/// Service owning the submit/read/delete lifecycle of submissions.
#[derive(Clone)]
pub struct SubmissionService {
    store: Arc<dyn FormStore>,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn FormStore>) -> Self {
        Self { store }
    }

    /// Ingest one submission against a published form.
    pub async fn submit_form(
        &self,
        form_id: Uuid,
        payload: Map<String, Value>,
        staged_files: Vec<UploadedFile>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let form = self
            .store
            .get_form(form_id)
            .await?
            .ok_or(SubmissionError::FormNotFound)?;

        if form.status != FormStatus::Published {
            return Err(SubmissionError::Forbidden(
                "Form is not published".to_string(),
            ));
        }
        // Fast-path rejection before validation runs; the conditional claim
        // below is what actually enforces the limit.
        if form.at_submission_limit() {
            return Err(SubmissionError::Forbidden(
                "Submission limit reached".to_string(),
            ));
        }

        // Files are reconciled into the data map before validation runs, so
        // a required file field is satisfied by either upload channel: after
        // normalization the field's entry holds the original filename.
        let (data, files) = normalize_files(&form, payload, staged_files);

        validate_submission(&form.fields, &data)?;

        match self.store.claim_submission_slot(form_id).await {
            Ok(_) => {}
            Err(StorageError::LimitReached { .. }) => {
                return Err(SubmissionError::Forbidden(
                    "Submission limit reached".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let submission = Submission::new(form_id, data, files);
        match self.store.create_submission(submission).await {
            Ok(created) => {
                debug!(form_id = %form_id, submission_id = %created.id, "submission accepted");
                Ok(SubmissionReceipt {
                    message: form.thank_you_message.clone(),
                    submission_id: created.id,
                })
            }
            Err(e) => {
                // The slot was claimed but the record never landed; hand the
                // slot back so the counter stays consistent.
                if let Err(release_err) = self.store.release_submission_slot(form_id).await {
                    warn!(
                        form_id = %form_id,
                        error = %release_err,
                        "failed to release submission slot after write failure"
                    );
                }
                Err(e.into())
            }
        }
    }

    /// All submissions for a form, newest first.
    pub async fn list_submissions(
        &self,
        form_id: Uuid,
    ) -> Result<Vec<Submission>, SubmissionError> {
        Ok(self.store.list_submissions(form_id).await?)
    }

    pub async fn get_submission(
        &self,
        form_id: Uuid,
        submission_id: Uuid,
    ) -> Result<Submission, SubmissionError> {
        self.store
            .get_submission(form_id, submission_id)
            .await?
            .ok_or(SubmissionError::SubmissionNotFound)
    }

    /// Delete a submission and decrement the parent form's counter.
    ///
    /// The two writes are not transactional: a failed decrement leaves an
    /// overcounted form behind and is logged rather than surfaced, since the
    /// deletion itself already succeeded.
    pub async fn delete_submission(
        &self,
        form_id: Uuid,
        submission_id: Uuid,
    ) -> Result<(), SubmissionError> {
        let deleted = self.store.delete_submission(form_id, submission_id).await?;
        if deleted.is_none() {
            return Err(SubmissionError::SubmissionNotFound);
        }
        if let Err(e) = self.store.release_submission_slot(form_id).await {
            warn!(
                form_id = %form_id,
                submission_id = %submission_id,
                error = %e,
                "submission deleted but counter decrement failed"
            );
        }
        Ok(())
    }
}

/// Reconcile both upload channels into attachment records and scrub the
/// stored data map.
///
/// Remote uploads arrive inline in the payload under prefixed bookkeeping
/// keys; staged uploads arrive as descriptors from the multipart step. Either
/// way the stored `data` entry for a file field becomes the original
/// filename, and the bookkeeping keys are dropped.
fn normalize_files(
    form: &Form,
    mut payload: Map<String, Value>,
    staged_files: Vec<UploadedFile>,
) -> (Map<String, Value>, Vec<crate::models::FileAttachment>) {
    let mut uploads: Vec<UploadedFile> = Vec::new();

    for field in form.fields.iter().filter(|f| f.field_type == FieldType::File) {
        let url = payload
            .get(&format!("{FILE_KEY_PREFIX}{}", field.name))
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty());
        let Some(url) = url else { continue };

        let name = payload
            .get(&format!("{FILENAME_KEY_PREFIX}{}", field.name))
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_ORIGINAL_NAME)
            .to_string();
        let size = payload
            .get(&format!("{FILESIZE_KEY_PREFIX}{}", field.name))
            .and_then(value_as_u64)
            .unwrap_or(0);
        let mime = payload
            .get(&format!("{FILETYPE_KEY_PREFIX}{}", field.name))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        uploads.push(UploadedFile::Remote {
            field_name: field.name.clone(),
            name,
            url: url.to_string(),
            size,
            mime,
        });
    }

    for staged in staged_files {
        let declared = form
            .fields
            .iter()
            .any(|f| f.field_type == FieldType::File && f.name == staged.field_name());
        if declared {
            uploads.push(staged);
        } else {
            debug!(
                field_name = staged.field_name(),
                "ignoring staged upload for undeclared file field"
            );
        }
    }

    payload.retain(|key, _| {
        !(key.starts_with(FILE_KEY_PREFIX)
            || key.starts_with(FILENAME_KEY_PREFIX)
            || key.starts_with(FILESIZE_KEY_PREFIX)
            || key.starts_with(FILETYPE_KEY_PREFIX))
    });

    let mut attachments = Vec::with_capacity(uploads.len());
    for upload in uploads {
        payload.insert(
            upload.field_name().to_string(),
            Value::String(upload.original_name().to_string()),
        );
        attachments.push(upload.into_attachment());
    }

    (payload, attachments)
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}
