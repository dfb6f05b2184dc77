//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, caller-facing failures (bad arguments,
/// missing records, rejected attributes). Storage failures belong to the
/// repository layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A caller-supplied identifier or filter key was missing or malformed.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A referenced record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// An attribute failed its declared rules.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Argument-class failures: both explicit argument errors and unparsable ids.
    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::InvalidId(_))
    }
}
