//! Submission routes: ingestion plus read/delete of collected responses.
//!
//! The submit endpoint accepts two body shapes: a JSON object whose file
//! fields were pre-uploaded to object storage (remote channel), or a
//! multipart form whose file parts are staged to local disk here before the
//! pipeline runs (staged channel).

use axum::{
    Router,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header},
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::path::{Path as FsPath, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::middleware::rate_limit::check_rate_limit;
use crate::models::{Submission, UploadedFile};

use super::app_state::AppState;
use super::error::ApiError;

/// Create the submissions router (nested under /forms)
pub fn submissions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{form_id}/submissions",
            post(submit_form).get(list_submissions),
        )
        .route(
            "/{form_id}/submissions/{submission_id}",
            get(get_submission).delete(delete_submission),
        )
}

/// POST /{form_id}/submissions - Submit a response to a published form
#[utoipa::path(
    post,
    path = "/forms/{form_id}/submissions",
    tag = "Submissions",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 201, description = "Submission accepted; thank-you message and submission id"),
        (status = 400, description = "Payload failed validation"),
        (status = 403, description = "Form not published or submission limit reached"),
        (status = 404, description = "Form not found"),
        (status = 429, description = "Submission rate limit exceeded")
    )
)]
pub async fn submit_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    request: Request,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !check_rate_limit(&state.submission_limiter) {
        warn!(form_id = %form_id, "submission rate limit exceeded");
        return Err(ApiError::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many submissions, please try again later.",
        ));
    }

    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (payload, staged_files) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?;
        read_multipart(multipart, &state.upload_dir).await?
    } else {
        let Json(body): Json<Value> = Json::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;
        let Some(map) = body.as_object() else {
            return Err(ApiError::bad_request("Submission payload must be a JSON object"));
        };
        (map.clone(), Vec::new())
    };

    let staged_paths: Vec<PathBuf> = staged_files
        .iter()
        .filter_map(|upload| match upload {
            UploadedFile::Staged { path, .. } => Some(path.clone()),
            UploadedFile::Remote { .. } => None,
        })
        .collect();

    let receipt = match state
        .submissions
        .submit_form(form_id, payload, staged_files)
        .await
    {
        Ok(receipt) => receipt,
        Err(e) => {
            // A rejected submission must not leave its staged files behind.
            discard_staged_files(&staged_paths).await;
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": receipt.message,
            "submissionId": receipt.submission_id,
        })),
    ))
}

/// GET /{form_id}/submissions - All submissions for a form, newest first
#[utoipa::path(
    get,
    path = "/forms/{form_id}/submissions",
    tag = "Submissions",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Submissions, newest first", body = [Submission])
    )
)]
pub async fn list_submissions(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>, ApiError> {
    Ok(Json(state.submissions.list_submissions(form_id).await?))
}

/// GET /{form_id}/submissions/{submission_id} - One submission
#[utoipa::path(
    get,
    path = "/forms/{form_id}/submissions/{submission_id}",
    tag = "Submissions",
    params(
        ("form_id" = Uuid, Path, description = "Form id"),
        ("submission_id" = Uuid, Path, description = "Submission id")
    ),
    responses(
        (status = 200, description = "The submission", body = Submission),
        (status = 404, description = "Submission not found")
    )
)]
pub async fn get_submission(
    State(state): State<AppState>,
    Path((form_id, submission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Submission>, ApiError> {
    let submission = state
        .submissions
        .get_submission(form_id, submission_id)
        .await?;
    Ok(Json(submission))
}

/// DELETE /{form_id}/submissions/{submission_id} - Delete a submission
#[utoipa::path(
    delete,
    path = "/forms/{form_id}/submissions/{submission_id}",
    tag = "Submissions",
    params(
        ("form_id" = Uuid, Path, description = "Form id"),
        ("submission_id" = Uuid, Path, description = "Submission id")
    ),
    responses(
        (status = 200, description = "Submission deleted"),
        (status = 404, description = "Submission not found")
    )
)]
pub async fn delete_submission(
    State(state): State<AppState>,
    Path((form_id, submission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    state
        .submissions
        .delete_submission(form_id, submission_id)
        .await?;
    Ok(Json(json!({ "message": "Submission deleted successfully" })))
}

/// Drain a multipart body into a payload map plus staged file descriptors.
///
/// Text parts become payload values; a repeated text part name becomes an
/// array (checkbox multi-select). File parts are written under the upload
/// directory with a unique prefix.
async fn read_multipart(
    mut multipart: Multipart,
    upload_dir: &FsPath,
) -> Result<(Map<String, Value>, Vec<UploadedFile>), ApiError> {
    let mut payload = Map::new();
    let mut staged = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let mime = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?;

            let path = stage_file(upload_dir, &file_name, &bytes).await?;
            staged.push(UploadedFile::Staged {
                field_name,
                name: file_name,
                path,
                size: bytes.len() as u64,
                mime,
            });
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?;
            insert_payload_value(&mut payload, field_name, text);
        }
    }

    Ok((payload, staged))
}

/// Remove staged files after their submission was rejected.
async fn discard_staged_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to remove staged file of rejected submission"
            );
        }
    }
}

/// Repeated part names accumulate into an array.
fn insert_payload_value(payload: &mut Map<String, Value>, key: String, text: String) {
    match payload.get_mut(&key) {
        Some(Value::Array(items)) => items.push(Value::String(text)),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, Value::String(text)]);
        }
        None => {
            payload.insert(key, Value::String(text));
        }
    }
}

/// Write an uploaded file under the upload directory with a unique prefix.
async fn stage_file(upload_dir: &FsPath, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ApiError> {
    // Only the final path component of the client-supplied name is kept.
    let base_name = FsPath::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "uploaded_file".to_string());
    let unique_name = format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        base_name
    );
    let path = upload_dir.join(unique_name);

    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        warn!(error = %e, "failed to create upload directory");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        warn!(error = %e, path = %path.display(), "failed to stage uploaded file");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })?;

    Ok(path)
}
