//! Password rules and the hashing seam.

use thiserror::Error;

use gatekeeper_core::{DomainError, DomainResult};

pub const DEFAULT_MIN_LENGTH: usize = 6;
pub const DEFAULT_MAX_LENGTH: usize = 32;

/// Hashing failed (bad parameters, corrupt stored hash).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub String);

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, HashError>;

    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, HashError>;
}

/// Rule set applied to plain-text passwords before hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl PasswordPolicy {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length: max_length.max(min_length),
        }
    }

    /// The first rule the password breaks, as a user-facing message.
    pub fn violation(&self, password: &str) -> Option<String> {
        let len = password.chars().count();
        if password.trim().is_empty() {
            return Some("password is required".to_string());
        }
        if len < self.min_length {
            return Some(format!("password must be at least {} characters", self.min_length));
        }
        if len > self.max_length {
            return Some(format!("password must be at most {} characters", self.max_length));
        }
        if password.chars().any(char::is_whitespace) {
            return Some("password must not contain whitespace".to_string());
        }
        None
    }

    pub fn validate(&self, password: &str) -> DomainResult<()> {
        match self.violation(password) {
            Some(msg) => Err(DomainError::validation(msg)),
            None => Ok(()),
        }
    }
}
