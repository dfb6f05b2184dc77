use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gatekeeper_core::{Entity, RoleId};

use crate::criteria::Filterable;
use crate::state::{DeletedState, EnableState, is_normality};

/// Named bundle of permissions assignable to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub state: EnableState,
    pub is_deleted: DeletedState,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: EnableState::default(),
            is_deleted: DeletedState::default(),
            created_at: None,
            updated_at: None,
        }
    }

    /// `true` when the role may be newly assigned.
    pub fn is_normality(&self) -> bool {
        is_normality(self.is_deleted, self.state)
    }

    /// Keep only the selected columns; everything else drops to its empty value.
    pub fn project(self, columns: &Columns) -> Self {
        if columns.is_all() {
            return self;
        }
        let empty = Role::new(RoleId::default(), String::new());
        Self {
            id: if columns.contains(RoleColumn::Id) { self.id } else { empty.id },
            name: if columns.contains(RoleColumn::Name) { self.name } else { empty.name },
            state: if columns.contains(RoleColumn::State) { self.state } else { empty.state },
            is_deleted: if columns.contains(RoleColumn::IsDeleted) {
                self.is_deleted
            } else {
                empty.is_deleted
            },
            created_at: if columns.contains(RoleColumn::CreatedAt) { self.created_at } else { None },
            updated_at: if columns.contains(RoleColumn::UpdatedAt) { self.updated_at } else { None },
        }
    }
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.id
    }
}

impl Filterable for Role {
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

/// Stored role columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleColumn {
    Id,
    Name,
    State,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

impl RoleColumn {
    pub const ALL: [RoleColumn; 6] = [
        RoleColumn::Id,
        RoleColumn::Name,
        RoleColumn::State,
        RoleColumn::IsDeleted,
        RoleColumn::CreatedAt,
        RoleColumn::UpdatedAt,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RoleColumn::Id => "id",
            RoleColumn::Name => "name",
            RoleColumn::State => "state",
            RoleColumn::IsDeleted => "is_deleted",
            RoleColumn::CreatedAt => "created_at",
            RoleColumn::UpdatedAt => "updated_at",
        }
    }
}

/// Column selection for reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Columns {
    #[default]
    All,
    Only(Vec<RoleColumn>),
}

impl Columns {
    pub fn only(columns: impl IntoIterator<Item = RoleColumn>) -> Self {
        Self::Only(columns.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        match self {
            Columns::All => true,
            Columns::Only(cols) => RoleColumn::ALL.iter().all(|c| cols.contains(c)),
        }
    }

    pub fn contains(&self, column: RoleColumn) -> bool {
        match self {
            Columns::All => true,
            Columns::Only(cols) => cols.contains(&column),
        }
    }

    /// Selected columns in storage order.
    pub fn selected(&self) -> Vec<RoleColumn> {
        RoleColumn::ALL
            .into_iter()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

/// Role attributes as submitted by a caller.
///
/// Used as the full attribute set on create and as a patch on update; absent
/// fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleAttributes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<EnableState>,
    #[serde(default)]
    pub is_deleted: Option<DeletedState>,
}

impl RoleAttributes {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_state(mut self, state: EnableState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_deleted(mut self, is_deleted: DeletedState) -> Self {
        self.is_deleted = Some(is_deleted);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.state.is_none() && self.is_deleted.is_none()
    }

    /// Overwrite the fields present in `self`.
    pub fn apply_to(&self, role: &mut Role) {
        if let Some(name) = &self.name {
            role.name = name.clone();
        }
        if let Some(state) = self.state {
            role.state = state;
        }
        if let Some(is_deleted) = self.is_deleted {
            role.is_deleted = is_deleted;
        }
    }
}
