//! Role lifecycle and role ↔ permission management.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use gatekeeper_core::{DomainError, PermissionId, RoleId};

use crate::batch::BatchWhere;
use crate::criteria::{
    Filter, IdInCriteria, IsDeletedCriteria, NameCriteria, NameLikeCriteria, Query, StateCriteria,
};
use crate::error::RbacResult;
use crate::page::{Page, PageRequest};
use crate::permission::Permission;
use crate::repository::{PermissionRepository, RolePermissionRepository, RoleRepository};
use crate::role::{Columns, Role, RoleAttributes};
use crate::state::DeletedState;

pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    role_permissions: Arc<dyn RolePermissionRepository>,
    permissions: Arc<dyn PermissionRepository>,
}

impl RoleService {
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        role_permissions: Arc<dyn RolePermissionRepository>,
        permissions: Arc<dyn PermissionRepository>,
    ) -> Self {
        Self {
            roles,
            role_permissions,
            permissions,
        }
    }

    /// Live, enabled roles, optionally narrowed by a name fragment.
    pub fn paginate(
        &self,
        page: PageRequest,
        name_like: Option<&str>,
        columns: &Columns,
    ) -> RbacResult<Page<Role>> {
        let query = Query::new()
            .with(&IsDeletedCriteria)
            .with(&StateCriteria::default())
            .with(&NameLikeCriteria::new(name_like));

        Ok(self.roles.paginate(&query, page, columns)?)
    }

    /// Point lookup; a missing role is `None`.
    pub fn find(&self, role_id: RoleId, columns: &Columns) -> RbacResult<Option<Role>> {
        Ok(self.roles.find(role_id, columns)?)
    }

    pub fn create(&self, attributes: RoleAttributes) -> RbacResult<Role> {
        let name = required_name(attributes.name.as_deref())?;
        self.ensure_name_available(&name, None)?;

        let attributes = RoleAttributes {
            name: Some(name),
            ..attributes
        };
        let role = self.roles.create(&attributes)?;
        info!(role_id = %role.id, name = %role.name, "role created");
        Ok(role)
    }

    pub fn update(&self, attributes: RoleAttributes, id: RoleId) -> RbacResult<Role> {
        let id = id.require()?;
        let current = self
            .roles
            .find(id, &Columns::All)?
            .ok_or_else(|| DomainError::not_found(format!("role {id}")))?;

        let attributes = match normalized_name(&attributes)? {
            Some(name) => RoleAttributes {
                name: Some(name),
                ..attributes
            },
            None => attributes,
        };

        // A rename or a restore must not produce a second live role with the same name.
        let stays_live = attributes.is_deleted.unwrap_or(current.is_deleted) == DeletedState::NotDeleted;
        let restored = current.is_deleted == DeletedState::Deleted && attributes.is_deleted == Some(DeletedState::NotDeleted);
        if stays_live && (attributes.name.is_some() || restored) {
            let name = attributes.name.as_deref().unwrap_or(&current.name);
            self.ensure_name_available(name, Some(id))?;
        }

        let role = self
            .roles
            .update(id, &attributes)?
            .ok_or_else(|| DomainError::not_found(format!("role {id}")))?;
        debug!(role_id = %id, "role updated");
        Ok(role)
    }

    /// Apply `attributes` to every role listed in `condition.id_arr`.
    ///
    /// A name can only be set on a single role.
    pub fn batch_update(&self, attributes: RoleAttributes, condition: &BatchWhere) -> RbacResult<u64> {
        let ids = condition.require_ids()?;

        let attributes = match (normalized_name(&attributes)?, ids) {
            (None, _) => attributes,
            (Some(name), [id]) => {
                self.ensure_name_available(&name, Some(RoleId::new(*id)))?;
                RoleAttributes {
                    name: Some(name),
                    ..attributes
                }
            }
            (Some(_), _) => {
                return Err(DomainError::argument("a role name cannot be set on more than one role").into());
            }
        };

        let query = Query::new().with(&IdInCriteria::new(ids.iter().copied()));
        let affected = self.roles.update_where(&query, &attributes)?;
        debug!(requested = ids.len(), affected, "roles batch updated");
        Ok(affected)
    }

    /// Soft delete. `true` iff exactly one role was flagged.
    pub fn delete(&self, id: RoleId) -> RbacResult<bool> {
        let query = Query::new().with(&IdInCriteria::new([id]));
        let attributes = RoleAttributes::default().with_deleted(DeletedState::Deleted);

        let affected = self.roles.update_where(&query, &attributes)?;
        Ok(affected == 1)
    }

    /// Soft delete the role and drop all of its permission links.
    pub fn retire(&self, id: RoleId) -> RbacResult<bool> {
        if !self.delete(id)? {
            return Ok(false);
        }
        let unlinked = self.role_permissions.delete_permission_by_role_id(id)?;
        info!(role_id = %id, unlinked, "role retired");
        Ok(true)
    }

    /// Unfiltered multi-lookup, ascending by id.
    pub fn get_role_collection_by_id_arr(&self, ids: &[RoleId], columns: &Columns) -> RbacResult<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new().with(&IdInCriteria::new(ids.iter().copied()));
        Ok(self.roles.find_where(&query, columns)?)
    }

    pub fn get_permission_id_arr_by_role_id(&self, role_id: RoleId) -> RbacResult<Vec<PermissionId>> {
        Ok(self.role_permissions.get_permission_id_arr_by_role_id(role_id)?)
    }

    /// Union of the permissions linked to `role_ids`, each permission once,
    /// in first-seen order.
    pub fn get_permission_collection_by_role_id_arr(&self, role_ids: &[RoleId]) -> RbacResult<Vec<Permission>> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for role_id in role_ids {
            for permission_id in self.role_permissions.get_permission_id_arr_by_role_id(*role_id)? {
                if seen.insert(permission_id) {
                    ids.push(permission_id);
                }
            }
        }

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.permissions.find_many(&ids)?)
    }

    /// Replace the permission set of a role.
    pub fn allot_permission(&self, role_id: RoleId, permission_ids: &[PermissionId]) -> RbacResult<bool> {
        let role_id = role_id.require()?;
        if self.roles.find(role_id, &Columns::All)?.is_none() {
            return Err(DomainError::not_found(format!("role {role_id}")).into());
        }

        let written = self.role_permissions.replace_permissions(role_id, permission_ids)?;
        debug!(role_id = %role_id, written, "role permissions replaced");
        Ok(true)
    }

    fn ensure_name_available(&self, name: &str, except: Option<RoleId>) -> RbacResult<()> {
        let mut query = Query::new()
            .with(&IsDeletedCriteria)
            .with(&NameCriteria::new(name));
        if let Some(id) = except {
            query = query.push(Filter::IdNot(id.get()));
        }

        if self.roles.find_where(&query, &Columns::All)?.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(format!("role name '{name}' is already taken")).into())
        }
    }
}

/// The trimmed name of a patch, if it carries one.
fn normalized_name(attributes: &RoleAttributes) -> Result<Option<String>, DomainError> {
    attributes
        .name
        .as_deref()
        .map(|raw| required_name(Some(raw)))
        .transpose()
}

fn required_name(name: Option<&str>) -> Result<String, DomainError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DomainError::validation("role name is required")),
    }
}
