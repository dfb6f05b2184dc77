//! Persistence ports.
//!
//! Services depend on these traits only; adapters (in-memory, Postgres) live
//! in the infrastructure crate. Lookups of absent records return `Ok(None)`:
//! deciding whether that is an error is the caller's business.

use std::sync::Arc;

use thiserror::Error;

use gatekeeper_core::{DomainError, DomainResult, PermissionId, RoleId, UserId};

use crate::admin::{Admin, AdminAttributes};
use crate::criteria::Query;
use crate::page::{Page, PageRequest};
use crate::permission::Permission;
use crate::role::{Columns, Role, RoleAttributes};

/// Storage failure surfaced by an adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness or integrity constraint rejected the write.
    #[error("constraint violated: {0}")]
    Conflict(String),

    /// Any other backend failure (connection, lock poisoning, decoding).
    #[error("storage error: {0}")]
    Storage(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Role records.
pub trait RoleRepository: Send + Sync {
    fn find(&self, id: RoleId, columns: &Columns) -> RepositoryResult<Option<Role>>;

    /// Every role matching `query`, ascending by id.
    fn find_where(&self, query: &Query, columns: &Columns) -> RepositoryResult<Vec<Role>>;

    /// Filter first, then slice.
    fn paginate(&self, query: &Query, page: PageRequest, columns: &Columns) -> RepositoryResult<Page<Role>>;

    /// Insert a role; absent attributes take their store defaults.
    fn create(&self, attributes: &RoleAttributes) -> RepositoryResult<Role>;

    fn update(&self, id: RoleId, attributes: &RoleAttributes) -> RepositoryResult<Option<Role>>;

    /// Returns the number of rows touched.
    fn update_where(&self, query: &Query, attributes: &RoleAttributes) -> RepositoryResult<u64>;
}

/// Equality conditions for bulk link deletion. At least one side is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConditions {
    role_id: Option<RoleId>,
    permission_id: Option<PermissionId>,
}

impl LinkConditions {
    pub fn new(role_id: Option<RoleId>, permission_id: Option<PermissionId>) -> DomainResult<Self> {
        if role_id.is_none() && permission_id.is_none() {
            return Err(DomainError::argument("delete conditions must not be empty"));
        }
        Ok(Self { role_id, permission_id })
    }

    pub fn by_role(role_id: RoleId) -> Self {
        Self {
            role_id: Some(role_id),
            permission_id: None,
        }
    }

    pub fn by_permission(permission_id: PermissionId) -> Self {
        Self {
            role_id: None,
            permission_id: Some(permission_id),
        }
    }

    pub fn role_id(&self) -> Option<RoleId> {
        self.role_id
    }

    pub fn permission_id(&self) -> Option<PermissionId> {
        self.permission_id
    }

    pub fn matches(&self, role_id: RoleId, permission_id: PermissionId) -> bool {
        self.role_id.is_none_or(|r| r == role_id)
            && self.permission_id.is_none_or(|p| p == permission_id)
    }
}

/// The role ↔ permission join.
pub trait RolePermissionRepository: Send + Sync {
    fn delete_where(&self, conditions: &LinkConditions) -> RepositoryResult<u64>;

    /// Drop every permission link of a role.
    fn delete_permission_by_role_id(&self, role_id: RoleId) -> RepositoryResult<u64> {
        self.delete_where(&LinkConditions::by_role(role_id))
    }

    /// Linked permission ids; empty when the role has none.
    fn get_permission_id_arr_by_role_id(&self, role_id: RoleId) -> RepositoryResult<Vec<PermissionId>>;

    /// Atomically replace a role's links; returns the number of links written.
    fn replace_permissions(&self, role_id: RoleId, permission_ids: &[PermissionId]) -> RepositoryResult<u64>;
}

/// Read access to the permission catalogue.
pub trait PermissionRepository: Send + Sync {
    /// Permissions for `ids`, in request order; unknown ids are skipped.
    fn find_many(&self, ids: &[PermissionId]) -> RepositoryResult<Vec<Permission>>;
}

/// Admin records and the user ↔ role join.
pub trait AdminRepository: Send + Sync {
    fn find(&self, id: UserId) -> RepositoryResult<Option<Admin>>;

    fn paginate(&self, query: &Query, page: PageRequest) -> RepositoryResult<Page<Admin>>;

    /// `attributes.password` must already be hashed.
    fn create(&self, attributes: &AdminAttributes) -> RepositoryResult<Admin>;

    fn update(&self, id: UserId, attributes: &AdminAttributes) -> RepositoryResult<Option<Admin>>;

    fn update_where(&self, query: &Query, attributes: &AdminAttributes) -> RepositoryResult<u64>;

    /// Replace the user's role set with exactly `role_ids`, atomically.
    fn allot_role(&self, user_id: UserId, role_ids: &[RoleId]) -> RepositoryResult<bool>;

    /// Remove every role link of the user.
    fn clear_role_by_user_id(&self, user_id: UserId) -> RepositoryResult<bool>;

    /// Linked roles regardless of their state, ascending by id.
    fn get_role_collection_by_user_id(&self, user_id: UserId) -> RepositoryResult<Vec<Role>>;
}

macro_rules! forward_arc {
    ($tr:ident { $(fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty;)* }) => {
        impl<S> $tr for Arc<S>
        where
            S: $tr + ?Sized,
        {
            $(
                fn $name(&self $(, $arg: $ty)*) -> $ret {
                    (**self).$name($($arg),*)
                }
            )*
        }
    };
}

forward_arc!(RoleRepository {
    fn find(&self, id: RoleId, columns: &Columns) -> RepositoryResult<Option<Role>>;
    fn find_where(&self, query: &Query, columns: &Columns) -> RepositoryResult<Vec<Role>>;
    fn paginate(&self, query: &Query, page: PageRequest, columns: &Columns) -> RepositoryResult<Page<Role>>;
    fn create(&self, attributes: &RoleAttributes) -> RepositoryResult<Role>;
    fn update(&self, id: RoleId, attributes: &RoleAttributes) -> RepositoryResult<Option<Role>>;
    fn update_where(&self, query: &Query, attributes: &RoleAttributes) -> RepositoryResult<u64>;
});

forward_arc!(RolePermissionRepository {
    fn delete_where(&self, conditions: &LinkConditions) -> RepositoryResult<u64>;
    fn delete_permission_by_role_id(&self, role_id: RoleId) -> RepositoryResult<u64>;
    fn get_permission_id_arr_by_role_id(&self, role_id: RoleId) -> RepositoryResult<Vec<PermissionId>>;
    fn replace_permissions(&self, role_id: RoleId, permission_ids: &[PermissionId]) -> RepositoryResult<u64>;
});

forward_arc!(PermissionRepository {
    fn find_many(&self, ids: &[PermissionId]) -> RepositoryResult<Vec<Permission>>;
});

forward_arc!(AdminRepository {
    fn find(&self, id: UserId) -> RepositoryResult<Option<Admin>>;
    fn paginate(&self, query: &Query, page: PageRequest) -> RepositoryResult<Page<Admin>>;
    fn create(&self, attributes: &AdminAttributes) -> RepositoryResult<Admin>;
    fn update(&self, id: UserId, attributes: &AdminAttributes) -> RepositoryResult<Option<Admin>>;
    fn update_where(&self, query: &Query, attributes: &AdminAttributes) -> RepositoryResult<u64>;
    fn allot_role(&self, user_id: UserId, role_ids: &[RoleId]) -> RepositoryResult<bool>;
    fn clear_role_by_user_id(&self, user_id: UserId) -> RepositoryResult<bool>;
    fn get_role_collection_by_user_id(&self, user_id: UserId) -> RepositoryResult<Vec<Role>>;
});
