//! Submission ingestion pipeline tests against the in-memory store.

use form_builder_api::models::{FieldSchema, FieldType, Form, FormStatus, UploadedFile};
use form_builder_api::services::{SubmissionError, SubmissionService};
use form_builder_api::storage::{FormStore, InMemoryFormStore};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

fn payload(entries: Value) -> Map<String, Value> {
    entries.as_object().cloned().unwrap()
}

fn published_form(fields: Vec<FieldSchema>) -> Form {
    let mut form = Form::new("Survey".to_string(), fields);
    form.status = FormStatus::Published;
    form
}

fn email_field() -> FieldSchema {
    let mut field = FieldSchema::new(FieldType::Email, "Email", "email");
    field.required = true;
    field
}

async fn setup(form: Form) -> (Arc<InMemoryFormStore>, SubmissionService, Uuid) {
    let store = Arc::new(InMemoryFormStore::new());
    let form = store.create_form(form).await.unwrap();
    let service = SubmissionService::new(store.clone());
    (store, service, form.id)
}

#[tokio::test]
async fn test_accepted_submission_increments_counter_once() {
    let (store, service, form_id) = setup(published_form(vec![email_field()])).await;

    let receipt = service
        .submit_form(form_id, payload(json!({"email": "a@b.co"})), Vec::new())
        .await
        .unwrap();
    assert_eq!(receipt.message, "Thank you for your submission!");

    let form = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(form.submissions_count, 1);

    let submissions = store.list_submissions(form_id).await.unwrap();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].form, form_id);
    assert_eq!(submissions[0].id, receipt.submission_id);
    assert_eq!(submissions[0].data.get("email"), Some(&json!("a@b.co")));
}

#[tokio::test]
async fn test_unknown_form_is_not_found() {
    let (_, service, _) = setup(published_form(vec![email_field()])).await;
    let err = service
        .submit_form(Uuid::new_v4(), Map::new(), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::FormNotFound));
}

#[tokio::test]
async fn test_draft_form_rejects_any_payload() {
    let draft = Form::new("Draft".to_string(), vec![email_field()]);
    let (store, service, form_id) = setup(draft).await;

    let err = service
        .submit_form(form_id, payload(json!({"email": "a@b.co"})), Vec::new())
        .await
        .unwrap_err();
    match err {
        SubmissionError::Forbidden(message) => assert_eq!(message, "Form is not published"),
        other => panic!("expected Forbidden, got {:?}", other),
    }

    let form = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(form.submissions_count, 0);
    assert!(store.list_submissions(form_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_payload_propagates_validation_error() {
    let (store, service, form_id) = setup(published_form(vec![email_field()])).await;

    let err = service
        .submit_form(form_id, payload(json!({"email": "nope"})), Vec::new())
        .await
        .unwrap_err();
    match err {
        SubmissionError::Validation(inner) => {
            assert_eq!(inner.0, "Invalid email format for field \"Email\"");
        }
        other => panic!("expected Validation, got {:?}", other),
    }

    let form = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(form.submissions_count, 0);
}

#[tokio::test]
async fn test_submission_limit_scenario() {
    let mut form = published_form(vec![email_field()]);
    form.submission_limit = Some(1);
    let (store, service, form_id) = setup(form).await;

    service
        .submit_form(form_id, payload(json!({"email": "a@b.com"})), Vec::new())
        .await
        .unwrap();
    let loaded = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(loaded.submissions_count, 1);

    let err = service
        .submit_form(form_id, payload(json!({"email": "c@d.com"})), Vec::new())
        .await
        .unwrap_err();
    match err {
        SubmissionError::Forbidden(message) => assert_eq!(message, "Submission limit reached"),
        other => panic!("expected Forbidden, got {:?}", other),
    }

    // Rejection mutates nothing.
    let loaded = store.get_form(form_id).await.unwrap().unwrap();
    assert_eq!(loaded.submissions_count, 1);
    assert_eq!(store.list_submissions(form_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_remote_file_channel_normalization() {
    let mut cv = FieldSchema::new(FieldType::File, "CV", "cv");
    cv.required = false;
    let (store, service, form_id) =
        setup(published_form(vec![email_field(), cv])).await;

    let body = payload(json!({
        "email": "a@b.co",
        "file_cv": "https://cdn.example.com/cv.pdf",
        "filename_cv": "resume.pdf",
        "filesize_cv": "2048",
        "filetype_cv": "application/pdf"
    }));
    let receipt = service.submit_form(form_id, body, Vec::new()).await.unwrap();

    let submission = store
        .get_submission(form_id, receipt.submission_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(submission.files.len(), 1);
    let attachment = &submission.files[0];
    assert_eq!(attachment.field_name, "cv");
    assert_eq!(attachment.original_name, "resume.pdf");
    assert_eq!(attachment.url, "https://cdn.example.com/cv.pdf");
    assert_eq!(attachment.size, 2048);
    assert_eq!(attachment.mime_type, "application/pdf");

    // Bookkeeping keys are scrubbed; the file field holds the filename.
    assert_eq!(submission.data.get("cv"), Some(&json!("resume.pdf")));
    assert!(submission.data.get("file_cv").is_none());
    assert!(submission.data.get("filename_cv").is_none());
    assert!(submission.data.get("filesize_cv").is_none());
    assert!(submission.data.get("filetype_cv").is_none());
}

#[tokio::test]
async fn test_remote_file_channel_metadata_defaults() {
    let cv = FieldSchema::new(FieldType::File, "CV", "cv");
    let (store, service, form_id) = setup(published_form(vec![cv])).await;

    let body = payload(json!({"file_cv": "https://cdn.example.com/blob"}));
    let receipt = service.submit_form(form_id, body, Vec::new()).await.unwrap();

    let submission = store
        .get_submission(form_id, receipt.submission_id)
        .await
        .unwrap()
        .unwrap();
    let attachment = &submission.files[0];
    assert_eq!(attachment.original_name, "uploaded_file");
    assert_eq!(attachment.size, 0);
    assert_eq!(attachment.mime_type, "application/octet-stream");
}

#[tokio::test]
async fn test_staged_file_channel_normalization() {
    let cv = FieldSchema::new(FieldType::File, "CV", "cv");
    let (store, service, form_id) = setup(published_form(vec![cv])).await;

    let staged = UploadedFile::Staged {
        field_name: "cv".to_string(),
        name: "resume.pdf".to_string(),
        path: PathBuf::from("uploads/1700000-x-resume.pdf"),
        size: 4096,
        mime: "application/pdf".to_string(),
    };
    let receipt = service
        .submit_form(form_id, Map::new(), vec![staged])
        .await
        .unwrap();

    let submission = store
        .get_submission(form_id, receipt.submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submission.files.len(), 1);
    assert_eq!(submission.files[0].url, "uploads/1700000-x-resume.pdf");
    assert_eq!(submission.data.get("cv"), Some(&json!("resume.pdf")));
}

#[tokio::test]
async fn test_required_file_field_satisfied_by_remote_channel() {
    let mut cv = FieldSchema::new(FieldType::File, "CV", "cv");
    cv.required = true;
    let (store, service, form_id) = setup(published_form(vec![cv])).await;

    let body = payload(json!({
        "file_cv": "https://cdn.example.com/cv.pdf",
        "filename_cv": "resume.pdf"
    }));
    let receipt = service.submit_form(form_id, body, Vec::new()).await.unwrap();

    let submission = store
        .get_submission(form_id, receipt.submission_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submission.data.get("cv"), Some(&json!("resume.pdf")));
}

#[tokio::test]
async fn test_required_file_field_satisfied_by_staged_channel() {
    let mut cv = FieldSchema::new(FieldType::File, "CV", "cv");
    cv.required = true;
    let (_, service, form_id) = setup(published_form(vec![cv])).await;

    let staged = UploadedFile::Staged {
        field_name: "cv".to_string(),
        name: "resume.pdf".to_string(),
        path: PathBuf::from("uploads/1700000-x-resume.pdf"),
        size: 4096,
        mime: "application/pdf".to_string(),
    };
    service
        .submit_form(form_id, Map::new(), vec![staged])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_required_file_field_missing_is_rejected() {
    let mut cv = FieldSchema::new(FieldType::File, "CV", "cv");
    cv.required = true;
    let (store, service, form_id) = setup(published_form(vec![cv])).await;

    let err = service
        .submit_form(form_id, Map::new(), Vec::new())
        .await
        .unwrap_err();
    match err {
        SubmissionError::Validation(inner) => {
            assert_eq!(inner.0, "Field \"CV\" is required");
        }
        other => panic!("expected Validation, got {:?}", other),
    }
    assert_eq!(
        store.get_form(form_id).await.unwrap().unwrap().submissions_count,
        0
    );
}

#[tokio::test]
async fn test_staged_file_for_undeclared_field_is_ignored() {
    let (store, service, form_id) = setup(published_form(vec![email_field()])).await;

    let staged = UploadedFile::Staged {
        field_name: "not_a_field".to_string(),
        name: "x.bin".to_string(),
        path: PathBuf::from("uploads/x.bin"),
        size: 1,
        mime: "application/octet-stream".to_string(),
    };
    let receipt = service
        .submit_form(
            form_id,
            payload(json!({"email": "a@b.co"})),
            vec![staged],
        )
        .await
        .unwrap();

    let submission = store
        .get_submission(form_id, receipt.submission_id)
        .await
        .unwrap()
        .unwrap();
    assert!(submission.files.is_empty());
}

#[tokio::test]
async fn test_custom_thank_you_message() {
    let mut form = published_form(vec![email_field()]);
    form.thank_you_message = "Cheers!".to_string();
    let (_, service, form_id) = setup(form).await;

    let receipt = service
        .submit_form(form_id, payload(json!({"email": "a@b.co"})), Vec::new())
        .await
        .unwrap();
    assert_eq!(receipt.message, "Cheers!");
}

#[tokio::test]
async fn test_delete_submission_decrements_counter() {
    let (store, service, form_id) = setup(published_form(vec![email_field()])).await;

    let receipt = service
        .submit_form(form_id, payload(json!({"email": "a@b.co"})), Vec::new())
        .await
        .unwrap();
    assert_eq!(
        store.get_form(form_id).await.unwrap().unwrap().submissions_count,
        1
    );

    service
        .delete_submission(form_id, receipt.submission_id)
        .await
        .unwrap();
    assert_eq!(
        store.get_form(form_id).await.unwrap().unwrap().submissions_count,
        0
    );
}

#[tokio::test]
async fn test_delete_unknown_submission_leaves_counter_alone() {
    let (store, service, form_id) = setup(published_form(vec![email_field()])).await;

    service
        .submit_form(form_id, payload(json!({"email": "a@b.co"})), Vec::new())
        .await
        .unwrap();

    let err = service
        .delete_submission(form_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::SubmissionNotFound));
    assert_eq!(
        store.get_form(form_id).await.unwrap().unwrap().submissions_count,
        1
    );
}

#[tokio::test]
async fn test_get_submission_round_trip() {
    let (_, service, form_id) = setup(published_form(vec![email_field()])).await;

    let receipt = service
        .submit_form(form_id, payload(json!({"email": "a@b.co"})), Vec::new())
        .await
        .unwrap();

    let submission = service
        .get_submission(form_id, receipt.submission_id)
        .await
        .unwrap();
    assert_eq!(submission.form, form_id);

    let err = service
        .get_submission(Uuid::new_v4(), receipt.submission_id)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::SubmissionNotFound));
}
