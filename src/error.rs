//! Error types for point stores, regions and location hashing.

use crate::point::Resolution;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PointStoreError>;

/// Errors produced by point algebra, hashing and store operations.
///
/// Structural violations (degree, resolution, ordering, bounds, hash width) are caller bugs and
/// are returned from the offending call. Failures of asynchronous operations are
/// only ever delivered through the returned future or stream.
#[derive(Debug, Error)]
pub enum PointStoreError {
    #[error("Degrees do not match: expected {expected}, found {found}")]
    DegreeMismatch { expected: usize, found: usize },

    #[error("Resolutions do not match: expected {expected}, found {found}")]
    ResolutionMismatch {
        expected: Resolution,
        found: Resolution,
    },

    #[error("Points are not co-located: comparison with the set is not equal")]
    NotColocated,

    #[error("Invalid region: lower bound is greater than upper bound")]
    InvertedRegion,

    #[error("Hash precision {precision} + shift {shift} exceeds 64 bits")]
    HashWidth { precision: u32, shift: u32 },

    #[error("Invalid resolution: {0}")]
    InvalidResolution(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No current key: call next() or next_key() first")]
    NoCurrentKey,

    #[error("Store is closed")]
    StoreClosed,

    #[error("Background task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid snapshot format")]
    InvalidFormat,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PointStoreError {
    fn from(err: serde_json::Error) -> Self {
        PointStoreError::Serialization(err.to_string())
    }
}

#[cfg(feature = "snapshot")]
impl From<bincode::Error> for PointStoreError {
    fn from(err: bincode::Error) -> Self {
        PointStoreError::Serialization(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for PointStoreError {
    fn from(err: toml::de::Error) -> Self {
        PointStoreError::Serialization(err.to_string())
    }
}
