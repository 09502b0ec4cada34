//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Forms
        crate::routes::forms::create_form,
        crate::routes::forms::list_forms,
        crate::routes::forms::get_form,
        crate::routes::forms::update_form,
        crate::routes::forms::delete_form,
        crate::routes::forms::duplicate_form,
        crate::routes::forms::form_analytics,
        // Submissions
        crate::routes::submissions::submit_form,
        crate::routes::submissions::list_submissions,
        crate::routes::submissions::get_submission,
        crate::routes::submissions::delete_submission,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::Form,
        crate::models::FormStatus,
        crate::models::FieldSchema,
        crate::models::FieldType,
        crate::models::FieldValidation,
        crate::models::Submission,
        crate::models::FileAttachment,
        crate::routes::forms::CreateFormRequest,
        crate::routes::forms::UpdateFormRequest,
    )),
    tags(
        (name = "Forms", description = "Form authoring and lifecycle"),
        (name = "Submissions", description = "Submission ingestion and review"),
        (name = "OpenAPI", description = "API documentation")
    ),
    info(
        title = "Form Builder API",
        description = "Design forms with typed fields, publish them, collect submissions",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;
