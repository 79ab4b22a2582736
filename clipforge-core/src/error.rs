use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for clipforge
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid edit spec: {0}")]
    InvalidSpec(String),

    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Encoder not found: {0}")]
    EncoderNotFound(String),

    #[error("Failed to start encoder: {0}")]
    CommandStart(String),

    #[error("Encoder execution failed: {0}")]
    CommandFailed(String),

    #[error("Media probe failed: {0}")]
    Probe(String),

    #[error("Watermark rendering failed: {0}")]
    Watermark(String),
}

/// Result type for clipforge operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
