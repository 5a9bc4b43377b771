//! Error types for geobatch.

use thiserror::Error;

/// Errors raised by geobatch operations.
///
/// Only malformed invocations (mismatched batch lengths, bad grid geometry,
/// bad configuration) are returned to callers. Per-item and per-chunk
/// failures are converted into error counts by the processing layer.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Length mismatch: {from} source points vs {to} target points")]
    LengthMismatch { from: usize, to: usize },

    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("Invalid grid size: {0} (must be between 1 and {max})", max = crate::compute::spatial::MAX_GRID_SIZE)]
    InvalidGridSize(u32),

    #[error("Worker failed on chunk {chunk_index}: {reason}")]
    WorkerFailure { chunk_index: usize, reason: String },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GeoError {
    /// Whether this error is contained at the item level (counted, not raised).
    pub fn is_item_error(&self) -> bool {
        matches!(
            self,
            GeoError::InvalidCoordinate { .. }
                | GeoError::MissingField(_)
                | GeoError::InvalidField { .. }
        )
    }
}

impl From<rayon::ThreadPoolBuildError> for GeoError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        GeoError::WorkerPool(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
