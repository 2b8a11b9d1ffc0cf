//! Error types for sphere tessellation

use thiserror::Error;

/// Errors that can occur while building or running a tessellation
#[derive(Debug, Error)]
pub enum TessellationError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The request was rejected before any sampling took place
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The spherical triangulation could not produce a valid closed mesh
    #[error("triangulation failed: {0}")]
    TriangulationFailed(String),
    /// The caller asked to stop at a progress checkpoint
    #[error("tessellation cancelled")]
    Cancelled,
    /// Request or response (de)serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tessellation operations
pub type Result<T> = std::result::Result<T, TessellationError>;
