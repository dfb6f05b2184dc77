//! Administrative user records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeeper_core::{Entity, UserId};

use crate::criteria::Filterable;
use crate::state::{DeletedState, EnableState, is_normality};

/// Administrative user.
///
/// `password` always holds the hashed secret and is never serialized or
/// printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: UserId,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub state: EnableState,
    pub is_deleted: DeletedState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Admin {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            password: String::new(),
            state: EnableState::default(),
            is_deleted: DeletedState::default(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_normality(&self) -> bool {
        is_normality(self.is_deleted, self.state)
    }
}

impl core::fmt::Debug for Admin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Admin")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("state", &self.state)
            .field("is_deleted", &self.is_deleted)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Entity for Admin {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }
}

impl Filterable for Admin {
    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> EnableState {
        self.state
    }

    fn is_deleted(&self) -> DeletedState {
        self.is_deleted
    }
}

/// Admin attributes as submitted by a caller (create or patch).
///
/// `password` is plain text on the way in; the user service validates and
/// hashes it before anything reaches a repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct AdminAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub state: Option<EnableState>,
    #[serde(default)]
    pub is_deleted: Option<DeletedState>,
}

impl AdminAttributes {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: EnableState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn apply_to(&self, admin: &mut Admin) {
        if let Some(name) = &self.name {
            admin.name = name.clone();
        }
        if let Some(password) = &self.password {
            admin.password = password.clone();
        }
        if let Some(state) = self.state {
            admin.state = state;
        }
        if let Some(is_deleted) = self.is_deleted {
            admin.is_deleted = is_deleted;
        }
    }
}

// Keep secrets out of debug logs of attribute payloads.
impl core::fmt::Display for AdminAttributes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "AdminAttributes {{ name: {:?}, password: {}, state: {:?}, is_deleted: {:?} }}",
            self.name,
            if self.password.is_some() { "<set>" } else { "<unset>" },
            self.state,
            self.is_deleted
        )
    }
}
