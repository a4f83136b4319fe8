use thiserror::Error;

/// Errors emitted while evaluating a suite.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid suite: {0}")]
    InvalidSuite(String),
    #[error("generation error: {0}")]
    Generation(#[from] casegen_generate::GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
