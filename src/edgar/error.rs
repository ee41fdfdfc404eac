//! Log I/O Error Types

use thiserror::Error;

/// Errors raised while reading access logs or writing sessions
#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log is empty, expected a header row")]
    MissingHeader,

    #[error("Header is missing column: {0}")]
    MissingColumn(String),

    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for log I/O
pub type LogResult<T> = Result<T, LogError>;
