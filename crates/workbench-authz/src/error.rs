//! Access-control configuration error types.

use std::path::PathBuf;

use thiserror::Error;
use workbench_core::error::WorkbenchError;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("route {method} {resource} is mapped more than once")]
    DuplicateRoute { resource: String, method: String },
}

impl From<AuthzError> for WorkbenchError {
    fn from(err: AuthzError) -> Self {
        WorkbenchError::Configuration(err.to_string())
    }
}
