//! Error types for percepta

use thiserror::Error;

/// Main error type for percepta operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Too few usable points, no valid normals, or a zero-length vector
    /// where a direction was required.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Size mismatch: {features} feature vectors for {positions} cluster positions")]
    SizeMismatch { features: usize, positions: usize },

    #[error("Index {index} out of range for point cloud of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Malformed configuration: {0}")]
    MalformedConfiguration(String),
}

impl Error {
    /// Whether this error is a recoverable per-cluster geometry failure
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Error::DegenerateGeometry(_))
    }
}

/// Result type alias for percepta operations
pub type Result<T> = std::result::Result<T, Error>;
