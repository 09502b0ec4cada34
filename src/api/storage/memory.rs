//! In-memory storage backend.
//!
//! The document store used by default and by the test suite. Both counter
//! primitives take the write lock for the whole read-modify-write, so the
//! conditional increment is atomic with respect to concurrent submissions.

use super::{StorageError, traits::FormStore};
use crate::models::{Form, Submission};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory form/submission store backed by `tokio::sync::RwLock` maps.
#[derive(Default)]
pub struct InMemoryFormStore {
    forms: RwLock<HashMap<Uuid, Form>>,
    submissions: RwLock<HashMap<Uuid, Submission>>,
}

impl InMemoryFormStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(entity_type: &str, id: Uuid) -> StorageError {
        StorageError::NotFound {
            entity_type: entity_type.to_string(),
            entity_id: id.to_string(),
        }
    }
}

#[async_trait]
impl FormStore for InMemoryFormStore {
    async fn create_form(&self, form: Form) -> Result<Form, StorageError> {
        let mut forms = self.forms.write().await;
        forms.insert(form.id, form.clone());
        Ok(form)
    }

    async fn list_forms(&self) -> Result<Vec<Form>, StorageError> {
        let forms = self.forms.read().await;
        let mut all: Vec<Form> = forms.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn get_form(&self, form_id: Uuid) -> Result<Option<Form>, StorageError> {
        let forms = self.forms.read().await;
        Ok(forms.get(&form_id).cloned())
    }

    async fn update_form(&self, form: Form) -> Result<Form, StorageError> {
        let mut forms = self.forms.write().await;
        if !forms.contains_key(&form.id) {
            return Err(Self::not_found("Form", form.id));
        }
        forms.insert(form.id, form.clone());
        Ok(form)
    }

    async fn delete_form(&self, form_id: Uuid) -> Result<Option<Form>, StorageError> {
        let mut forms = self.forms.write().await;
        Ok(forms.remove(&form_id))
    }

    async fn create_submission(&self, submission: Submission) -> Result<Submission, StorageError> {
        let mut submissions = self.submissions.write().await;
        submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn list_submissions(&self, form_id: Uuid) -> Result<Vec<Submission>, StorageError> {
        let submissions = self.submissions.read().await;
        let mut matching: Vec<Submission> = submissions
            .values()
            .filter(|s| s.form == form_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn get_submission(
        &self,
        form_id: Uuid,
        submission_id: Uuid,
    ) -> Result<Option<Submission>, StorageError> {
        let submissions = self.submissions.read().await;
        Ok(submissions
            .get(&submission_id)
            .filter(|s| s.form == form_id)
            .cloned())
    }

    async fn delete_submission(
        &self,
        form_id: Uuid,
        submission_id: Uuid,
    ) -> Result<Option<Submission>, StorageError> {
        let mut submissions = self.submissions.write().await;
        let matches = submissions
            .get(&submission_id)
            .is_some_and(|s| s.form == form_id);
        if !matches {
            return Ok(None);
        }
        Ok(submissions.remove(&submission_id))
    }

    async fn claim_submission_slot(&self, form_id: Uuid) -> Result<u32, StorageError> {
        let mut forms = self.forms.write().await;
        let form = forms
            .get_mut(&form_id)
            .ok_or_else(|| Self::not_found("Form", form_id))?;
        if form.at_submission_limit() {
            return Err(StorageError::LimitReached {
                form_id: form_id.to_string(),
            });
        }
        form.submissions_count += 1;
        form.updated_at = chrono::Utc::now();
        Ok(form.submissions_count)
    }

    async fn release_submission_slot(&self, form_id: Uuid) -> Result<u32, StorageError> {
        let mut forms = self.forms.write().await;
        let form = forms
            .get_mut(&form_id)
            .ok_or_else(|| Self::not_found("Form", form_id))?;
        form.submissions_count = form.submissions_count.saturating_sub(1);
        form.updated_at = chrono::Utc::now();
        Ok(form.submissions_count)
    }
}
