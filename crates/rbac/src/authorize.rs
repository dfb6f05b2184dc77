use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use gatekeeper_core::UserId;

use crate::permission::Permission;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check a resolved permission set against a required path.
///
/// - No IO
/// - No panics
/// - `"*"` grants everything
pub fn authorize(granted: &[Permission], required_path: &str) -> Result<(), AuthzError> {
    if granted
        .iter()
        .any(|p| p.is_wildcard() || p.path == required_path)
    {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required_path.to_string()))
    }
}

/// Why an authorization check came out the way it did (audit/debug output).
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub user_id: UserId,
    pub required_path: String,
    pub granted: bool,
    pub reason: String,
    /// Sorted, deduplicated permission paths the user holds.
    pub effective_paths: Vec<String>,
    pub has_wildcard: bool,
}

pub fn explain_authorization(
    user_id: UserId,
    granted: &[Permission],
    required_path: &str,
) -> AuthorizationExplanation {
    let effective: BTreeSet<&str> = granted.iter().map(|p| p.path.as_str()).collect();
    let has_wildcard = effective.contains("*");
    let has_required = effective.contains(required_path);

    let reason = if has_wildcard {
        "user holds the wildcard permission '*'".to_string()
    } else if has_required {
        format!("user holds permission '{required_path}'")
    } else if effective.is_empty() {
        "user holds no permissions (no roles, or roles without permissions)".to_string()
    } else {
        format!("user does not hold permission '{required_path}'")
    };

    AuthorizationExplanation {
        user_id,
        required_path: required_path.to_string(),
        granted: has_wildcard || has_required,
        reason,
        effective_paths: effective.into_iter().map(str::to_string).collect(),
        has_wildcard,
    }
}
