//! Form routes: authoring CRUD, duplication and analytics.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Form, FormStatus};
use crate::services::validate_form_definition;

use super::app_state::AppState;
use super::error::ApiError;

/// Request body for creating a form.
///
/// `fields` is raw JSON; the form definition validator is the gate that
/// turns it into typed field schemas (or rejects it with an authoring
/// message).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub fields: Value,
    #[serde(default)]
    pub status: Option<FormStatus>,
    #[serde(default)]
    pub thank_you_message: Option<String>,
    #[serde(default)]
    pub submission_limit: Option<u32>,
    #[serde(default)]
    pub allow_duplicates: Option<bool>,
    #[serde(default)]
    pub collect_emails: Option<bool>,
    #[serde(default)]
    pub require_login: Option<bool>,
}

/// An absent property deserializes to `None`; a present property, explicit
/// null included, deserializes to `Some(value)`. Distinguishes "leave it
/// alone" from "clear it" for nullable form properties.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for updating a form. Absent properties are left unchanged;
/// an explicit null clears `description` or `submissionLimit`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: Option<Value>,
    #[serde(default)]
    pub status: Option<FormStatus>,
    #[serde(default)]
    pub thank_you_message: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub submission_limit: Option<Option<u32>>,
    #[serde(default)]
    pub allow_duplicates: Option<bool>,
    #[serde(default)]
    pub collect_emails: Option<bool>,
    #[serde(default)]
    pub require_login: Option<bool>,
}

/// Create the forms router
pub fn forms_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_form).get(list_forms))
        .route(
            "/{form_id}",
            get(get_form).put(update_form).delete(delete_form),
        )
        .route("/{form_id}/duplicate", post(duplicate_form))
        .route("/{form_id}/analytics", get(form_analytics))
}

async fn load_form(state: &AppState, form_id: Uuid) -> Result<Form, ApiError> {
    state
        .store
        .get_form(form_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Form not found"))
}

/// POST / - Create a form from an authored definition
#[utoipa::path(
    post,
    path = "/forms",
    tag = "Forms",
    request_body = CreateFormRequest,
    responses(
        (status = 201, description = "Form created", body = Form),
        (status = 400, description = "Malformed form definition")
    )
)]
pub async fn create_form(
    State(state): State<AppState>,
    Json(request): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<Form>), ApiError> {
    let fields = validate_form_definition(&request.fields)?;

    let mut form = Form::new(request.title, fields);
    form.description = request.description;
    if let Some(status) = request.status {
        form.status = status;
    }
    if let Some(message) = request.thank_you_message {
        form.thank_you_message = message;
    }
    form.submission_limit = request.submission_limit;
    if let Some(allow_duplicates) = request.allow_duplicates {
        form.allow_duplicates = allow_duplicates;
    }
    if let Some(collect_emails) = request.collect_emails {
        form.collect_emails = collect_emails;
    }
    if let Some(require_login) = request.require_login {
        form.require_login = require_login;
    }

    let created = state.store.create_form(form).await?;
    info!(form_id = %created.id, title = %created.title, "form created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET / - List all forms, newest first
#[utoipa::path(
    get,
    path = "/forms",
    tag = "Forms",
    responses(
        (status = 200, description = "All forms, newest first", body = [Form])
    )
)]
pub async fn list_forms(State(state): State<AppState>) -> Result<Json<Vec<Form>>, ApiError> {
    Ok(Json(state.store.list_forms().await?))
}

/// GET /{form_id} - Get one form
#[utoipa::path(
    get,
    path = "/forms/{form_id}",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "The form", body = Form),
        (status = 404, description = "Form not found")
    )
)]
pub async fn get_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Form>, ApiError> {
    Ok(Json(load_form(&state, form_id).await?))
}

/// PUT /{form_id} - Update a form; a new field list is revalidated
#[utoipa::path(
    put,
    path = "/forms/{form_id}",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form id")),
    request_body = UpdateFormRequest,
    responses(
        (status = 200, description = "Updated form", body = Form),
        (status = 400, description = "Malformed form definition"),
        (status = 404, description = "Form not found")
    )
)]
pub async fn update_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
    Json(request): Json<UpdateFormRequest>,
) -> Result<Json<Form>, ApiError> {
    let mut form = load_form(&state, form_id).await?;

    if let Some(fields) = &request.fields {
        form.fields = validate_form_definition(fields)?;
    }
    if let Some(title) = request.title {
        form.title = title;
    }
    if let Some(description) = request.description {
        form.description = description;
    }
    if let Some(status) = request.status {
        form.status = status;
    }
    if let Some(message) = request.thank_you_message {
        form.thank_you_message = message;
    }
    if let Some(limit) = request.submission_limit {
        form.submission_limit = limit;
    }
    if let Some(allow_duplicates) = request.allow_duplicates {
        form.allow_duplicates = allow_duplicates;
    }
    if let Some(collect_emails) = request.collect_emails {
        form.collect_emails = collect_emails;
    }
    if let Some(require_login) = request.require_login {
        form.require_login = require_login;
    }
    form.updated_at = Utc::now();

    let updated = state.store.update_form(form).await?;
    Ok(Json(updated))
}

/// DELETE /{form_id} - Delete a form
///
/// Submissions are not cascaded; they stay in the store as orphans.
#[utoipa::path(
    delete,
    path = "/forms/{form_id}",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Form deleted"),
        (status = 404, description = "Form not found")
    )
)]
pub async fn delete_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let deleted = state.store.delete_form(form_id).await?;
    if deleted.is_none() {
        return Err(ApiError::not_found("Form not found"));
    }
    info!(form_id = %form_id, "form deleted");
    Ok(Json(json!({ "message": "Form deleted" })))
}

/// POST /{form_id}/duplicate - Copy a form under a new identity
#[utoipa::path(
    post,
    path = "/forms/{form_id}/duplicate",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 201, description = "The duplicated form", body = Form),
        (status = 404, description = "Form not found")
    )
)]
pub async fn duplicate_form(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Form>), ApiError> {
    let form = load_form(&state, form_id).await?;
    let copy = state.store.create_form(form.duplicate()).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// GET /{form_id}/analytics - Aggregate numbers for one form
#[utoipa::path(
    get,
    path = "/forms/{form_id}/analytics",
    tag = "Forms",
    params(("form_id" = Uuid, Path, description = "Form id")),
    responses(
        (status = 200, description = "Submission total plus form timestamps"),
        (status = 404, description = "Form not found")
    )
)]
pub async fn form_analytics(
    State(state): State<AppState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let form = load_form(&state, form_id).await?;
    let submissions = state.store.list_submissions(form_id).await?;
    Ok(Json(json!({
        "total": submissions.len(),
        "createdAt": form.created_at,
        "updatedAt": form.updated_at,
    })))
}
