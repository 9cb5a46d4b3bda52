//! Error types for gt-io.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading inputs.  All of these are fatal and surface
/// before any computation starts.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{}: cannot open: {source}", path.display())]
    Open {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: missing required column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}: row {row}, column `{column}`: {message}", path.display())]
    Parse {
        path:    PathBuf,
        /// 1-based data row, not counting the header.
        row:     usize,
        column:  &'static str,
        message: String,
    },

    #[error("{}: no data rows", path.display())]
    Empty { path: PathBuf },

    #[error("{}: not a GeoJSON FeatureCollection", path.display())]
    NotFeatureCollection { path: PathBuf },

    #[error("{}: feature {feature}: {message}", path.display())]
    Geometry {
        path:    PathBuf,
        feature: usize,
        message: String,
    },

    #[error("{}: no feature has {property} = {name:?}", path.display())]
    NoShapesSelected {
        path:     PathBuf,
        property: String,
        name:     String,
    },

    #[error("elevation lookup failed: {0}")]
    Elevation(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, InputError>`.
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur when writing output files.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: missing required column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
