//! Record lifecycle flags shared by roles and admins.
//!
//! Soft-delete and enable/disable are two independent flags. Both are stored
//! as small integers (`state`: 1 enabled / 2 disabled, `is_deleted`: 0 / 1),
//! which is also their serde representation.

use serde::{Deserialize, Serialize};

use gatekeeper_core::DomainError;

/// Enable/disable toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum EnableState {
    #[default]
    Enabled,
    Disabled,
}

impl EnableState {
    pub const fn code(self) -> i16 {
        match self {
            EnableState::Enabled => 1,
            EnableState::Disabled => 2,
        }
    }
}

impl TryFrom<i16> for EnableState {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EnableState::Enabled),
            2 => Ok(EnableState::Disabled),
            other => Err(DomainError::argument(format!("unknown state: {other}"))),
        }
    }
}

impl From<EnableState> for i16 {
    fn from(value: EnableState) -> Self {
        value.code()
    }
}

impl core::fmt::Display for EnableState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EnableState::Enabled => write!(f, "Enabled"),
            EnableState::Disabled => write!(f, "Disabled"),
        }
    }
}

/// Soft-delete flag. Deleted records stay in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum DeletedState {
    #[default]
    NotDeleted,
    Deleted,
}

impl DeletedState {
    pub const fn code(self) -> i16 {
        match self {
            DeletedState::NotDeleted => 0,
            DeletedState::Deleted => 1,
        }
    }
}

impl TryFrom<i16> for DeletedState {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DeletedState::NotDeleted),
            1 => Ok(DeletedState::Deleted),
            other => Err(DomainError::argument(format!("unknown is_deleted flag: {other}"))),
        }
    }
}

impl From<DeletedState> for i16 {
    fn from(value: DeletedState) -> Self {
        value.code()
    }
}

impl core::fmt::Display for DeletedState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DeletedState::NotDeleted => write!(f, "NotDeleted"),
            DeletedState::Deleted => write!(f, "Deleted"),
        }
    }
}

/// A record is usable only when it is both live and enabled.
pub const fn is_normality(is_deleted: DeletedState, state: EnableState) -> bool {
    matches!(
        (is_deleted, state),
        (DeletedState::NotDeleted, EnableState::Enabled)
    )
}
