//! Error types for me-output.

use thiserror::Error;

/// Errors that can occur when writing the result file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid separator {0:?}: must be tab or a printable ASCII character other than '\"'")]
    InvalidSeparator(char),

    #[error("result file not open; begin() was not called")]
    NotOpen,
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
