//! Error types for model fitting and validation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data or fitting a model.
#[derive(Debug, Error)]
pub enum GlmError {
    /// I/O error reading a data file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error while downloading a dataset.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Download returned a non-success status.
    #[error("Download of {url} failed: HTTP {status}")]
    DownloadFailed {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// Malformed delimited text.
    #[error("CSV error on line {line}: {message}")]
    Csv {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Malformed JSON records.
    #[error("Invalid records: {0}")]
    InvalidRecords(String),

    /// No rows left to fit.
    #[error("No observations to fit")]
    EmptyData,

    /// Column lengths or design dimensions disagree.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Fewer observations than parameters.
    #[error("Not enough observations: {rows} rows for {params} parameters")]
    Underdetermined {
        /// Number of observations.
        rows: usize,
        /// Number of parameters.
        params: usize,
    },

    /// The weighted normal equations are not positive definite.
    #[error("Singular design matrix (collinear predictors?)")]
    Singular,

    /// A response value lies outside the family's support.
    #[error("Invalid response for {family} family at row {row}: {value}")]
    InvalidResponse {
        /// Family name.
        family: &'static str,
        /// Offending row.
        row: usize,
        /// Offending value.
        value: f64,
    },

    /// A named column does not exist.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Duplicate column name.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A model parameter is out of range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Optimization failed.
    #[error("Optimization failed: {0}")]
    OptimizationFailed(String),
}

impl GlmError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GlmError::Io {
            path: path.into(),
            source,
        }
    }
}
