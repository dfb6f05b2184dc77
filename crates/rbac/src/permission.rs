use serde::{Deserialize, Serialize};

use gatekeeper_core::{Entity, PermissionId};

/// Atomic grantable capability, identified by the route path it unlocks.
///
/// The path `"*"` is a wildcard that grants everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub path: String,
}

impl Permission {
    pub fn new(id: PermissionId, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.path == "*"
    }
}

impl Entity for Permission {
    type Id = PermissionId;

    fn id(&self) -> PermissionId {
        self.id
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path)
    }
}
