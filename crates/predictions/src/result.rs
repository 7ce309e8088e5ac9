use thiserror::Error;

pub type PredictionResult<T> = Result<T, PredictionError>;

/// Programmer-error conditions around engine invocation.
///
/// Heuristic misses (too little data, no pattern, low confidence) are
/// represented as empty output and never surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("forecast window must be 1..=12 months, got {0}")]
    InvalidWindow(i64),

    #[error("invalid job input: {0}")]
    InvalidInput(String),
}
