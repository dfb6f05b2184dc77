//! Domain events raised by the RBAC services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatekeeper_core::RoleId;
use gatekeeper_events::Event;

use crate::admin::Admin;

/// A user's role assignment was replaced.
///
/// Consumers typically drop cached permissions for `admin` or write an audit
/// record. The admin's password hash is stripped before the event is raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleChanged {
    pub event_id: Uuid,
    pub admin: Admin,
    /// The role set that was persisted (after filtering).
    pub role_ids: Vec<RoleId>,
    pub occurred_at: DateTime<Utc>,
}

impl UserRoleChanged {
    pub fn new(admin: Admin, role_ids: Vec<RoleId>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            admin: Admin {
                password: String::new(),
                ..admin
            },
            role_ids,
            occurred_at: Utc::now(),
        }
    }
}

impl Event for UserRoleChanged {
    fn event_type(&self) -> &'static str {
        "admin.user.role_changed"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
