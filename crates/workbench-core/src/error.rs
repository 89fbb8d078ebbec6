//! Error types for workbench access control.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbenchError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid sort field: {field}")]
    InvalidSortField { field: String },

    #[error("Invalid page size {limit}: must be between 1 and {max}")]
    InvalidPageSize { limit: usize, max: usize },

    #[error("Malformed permission entry: {entry:?}")]
    MalformedPermission { entry: String },

    /// Backing store failure (connectivity, throttling, query errors).
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WorkbenchResult<T> = Result<T, WorkbenchError>;
