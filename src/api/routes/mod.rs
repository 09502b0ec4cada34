//! API routes module - organizes all route handlers.

pub mod app_state;
pub mod error;
pub mod forms;
pub mod openapi;
pub mod submissions;

use axum::Router;
pub use app_state::AppState;
pub use error::ApiError;

/// Create the main API router combining all route modules
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest(
            "/forms",
            forms::forms_router().merge(submissions::submissions_router()),
        )
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
    // Note: State is applied by callers (e.g. main or a TestServer) via
    // .with_state(app_state)
}

/// Create the application state
pub fn create_app_state() -> AppState {
    AppState::new()
}
