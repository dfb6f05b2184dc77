//! Error type returned by the RBAC services.

use thiserror::Error;

use gatekeeper_core::DomainError;

use crate::password::HashError;
use crate::repository::RepositoryError;

pub type RbacResult<T> = Result<T, RbacError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RbacError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

impl RbacError {
    pub fn is_argument(&self) -> bool {
        matches!(self, RbacError::Domain(e) if e.is_argument())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RbacError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, RbacError::Domain(DomainError::Validation(_)))
    }
}
