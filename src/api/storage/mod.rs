//! Storage module for the API.
//!
//! Provides the form/submission store trait and the in-memory backend.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod memory;

pub use error::StorageError;
pub use memory::InMemoryFormStore;
pub use traits::FormStore;
