//! Configuration error type.
//!
//! Sub-crates define their own error enums; `CoreError` covers only what can
//! go wrong before a run starts.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("step size must be positive and finite, got {0}")]
    InvalidStepSize(f64),

    #[error("step size {step} is too small to advance time near t={at}")]
    StepTooSmall { step: f64, at: f64 },

    #[error("end time {end} is before start time {start}")]
    InvalidInterval { start: f64, end: f64 },

    #[error("{0} must be finite")]
    NonFinite(&'static str),

    #[error("tolerance must be positive, got {0}")]
    InvalidTolerance(f64),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for configuration checks.
pub type CoreResult<T> = Result<T, CoreError>;
