//! Conditions for bulk attribute updates.

use serde::Deserialize;
use serde_json::Value as JsonValue;

use gatekeeper_core::{DomainError, DomainResult};

/// Where-clause of a batch update: the ids to touch.
///
/// Mirrors the `{ "id_arr": [..] }` map callers submit. A missing or empty
/// `id_arr` is rejected before any update executes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchWhere {
    #[serde(default)]
    pub id_arr: Option<Vec<i64>>,
}

impl BatchWhere {
    pub fn ids<I: Into<i64>>(ids: impl IntoIterator<Item = I>) -> Self {
        Self {
            id_arr: Some(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Parse an untyped condition map; anything but a list of integers under
    /// `id_arr` is an argument error.
    pub fn from_value(value: JsonValue) -> DomainResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| DomainError::argument(format!("where condition is malformed: {e}")))
    }

    /// The non-empty id list, or an argument error. Ids must be positive;
    /// `0` is the unset id.
    pub fn require_ids(&self) -> DomainResult<&[i64]> {
        match self.id_arr.as_deref() {
            Some(ids) if !ids.is_empty() => {
                if let Some(bad) = ids.iter().find(|id| **id <= 0) {
                    return Err(DomainError::argument(format!("where.id_arr contains invalid id {bad}")));
                }
                Ok(ids)
            }
            _ => Err(DomainError::argument("where.id_arr must be a non-empty list of ids")),
        }
    }
}
