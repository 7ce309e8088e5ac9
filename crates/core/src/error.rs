//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic input failures (malformed calendar
/// values). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A month number outside 1..=12 or an unparseable `YYYY-MM` key.
    #[error("invalid month: {0}")]
    InvalidMonth(String),
}

impl DomainError {
    pub fn invalid_month(msg: impl Into<String>) -> Self {
        Self::InvalidMonth(msg.into())
    }
}
