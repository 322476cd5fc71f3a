//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid path segment: {0}")]
    InvalidPath(String),

    #[error("malformed package: {0}")]
    MalformedPackage(String),

    #[error("index assembly error: {0}")]
    Index(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
