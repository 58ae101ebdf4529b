//! Error types for Emberfall.

use thiserror::Error;

/// Top-level error type for Emberfall operations.
#[derive(Debug, Error)]
pub enum EmberfallError {
    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Emberfall operations.
pub type EmberfallResult<T> = Result<T, EmberfallError>;
