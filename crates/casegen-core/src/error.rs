use thiserror::Error;

/// Core error type shared across casegen crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The schema document is not valid JSON or has the wrong shape.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by casegen crates.
pub type Result<T> = std::result::Result<T, Error>;
