// API module for the form builder backend
pub mod api;

// Re-export api modules at crate root so routes can use crate::services, crate::models
pub use api::middleware;
pub use api::models;
pub use api::openapi;
pub use api::routes;
pub use api::services;
pub use api::storage;
