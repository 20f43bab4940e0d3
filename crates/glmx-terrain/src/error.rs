//! Error types for the terrain crate.

use thiserror::Error;

/// Errors that can occur when producing elevation grids.
#[derive(Debug, Error)]
pub enum TerrainError {
    /// I/O error reading or writing a grid file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error when talking to the elevation API.
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The elevation API answered with a non-success status.
    #[error("Elevation request for batch {batch} failed: {reason}")]
    RequestFailed {
        /// Zero-based batch index.
        batch: usize,
        /// Reason for failure.
        reason: String,
    },

    /// The elevation API returned a different number of values than requested.
    #[error("Batch {batch} returned {got} elevations, expected {expected}")]
    BatchLength {
        /// Zero-based batch index.
        batch: usize,
        /// Number of points requested.
        expected: usize,
        /// Number of elevations returned.
        got: usize,
    },

    /// Batch size is zero or above the API limit.
    #[error("Invalid batch size {0} (must be 1-{max})", max = crate::MAX_BATCH_SIZE)]
    InvalidBatchSize(usize),

    /// Grid is too small to place samples on both edges of the bounding box.
    #[error("Invalid grid size {rows}x{cols} (need at least 2x2)")]
    InvalidGridSize {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// Bounding box is empty or inverted.
    #[error("Invalid bounds: south={south} north={north} west={west} east={east}")]
    InvalidBounds {
        /// South edge.
        south: f64,
        /// North edge.
        north: f64,
        /// West edge.
        west: f64,
        /// East edge.
        east: f64,
    },

    /// The elevation array does not match the stated grid dimensions.
    #[error("Grid shape mismatch: {0}")]
    GridShape(String),
}
