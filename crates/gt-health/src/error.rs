//! Error types for gt-health.

use std::path::PathBuf;

use thiserror::Error;

use gt_io::OutputError;

/// Errors produced by `gt-health`.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("{}: cannot open: {source}", path.display())]
    Open {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node {id} appears more than once")]
    DuplicateNode { id: String },

    #[error("node {id} has no {field} attribute")]
    MissingCoordinates { id: String, field: &'static str },

    #[error("link {source_id} -- {target_id} references unknown node {missing}")]
    UnknownEndpoint {
        source_id: String,
        target_id: String,
        missing:   String,
    },

    #[error("invalid health-seeking configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Alias for `Result<T, HealthError>`.
pub type HealthResult<T> = Result<T, HealthError>;
