//! Admin accounts, role assignment and permission resolution.

use std::sync::Arc;

use tracing::{debug, info, warn};

use gatekeeper_core::{DomainError, Entity, RoleId, UserId};
use gatekeeper_events::{Event, EventBus};

use crate::admin::{Admin, AdminAttributes};
use crate::authorize::{AuthorizationExplanation, authorize, explain_authorization};
use crate::batch::BatchWhere;
use crate::criteria::{IdInCriteria, IsDeletedCriteria, Query, StateCriteria};
use crate::error::RbacResult;
use crate::events::UserRoleChanged;
use crate::page::{Page, PageRequest};
use crate::password::{PasswordHasher, PasswordPolicy};
use crate::permission::Permission;
use crate::repository::AdminRepository;
use crate::role::{Columns, Role, RoleColumn};
use crate::role_service::RoleService;

pub struct UserService<B> {
    admins: Arc<dyn AdminRepository>,
    role_service: Arc<RoleService>,
    hasher: Arc<dyn PasswordHasher>,
    policy: PasswordPolicy,
    bus: B,
}

impl<B> UserService<B>
where
    B: EventBus<UserRoleChanged>,
{
    pub fn new(
        admins: Arc<dyn AdminRepository>,
        role_service: Arc<RoleService>,
        hasher: Arc<dyn PasswordHasher>,
        policy: PasswordPolicy,
        bus: B,
    ) -> Self {
        Self {
            admins,
            role_service,
            hasher,
            policy,
            bus,
        }
    }

    pub fn find(&self, id: UserId) -> RbacResult<Option<Admin>> {
        Ok(self.admins.find(id)?)
    }

    pub fn create(&self, attributes: AdminAttributes) -> RbacResult<Admin> {
        let name = match attributes.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(DomainError::validation("name is required").into()),
        };
        if attributes.password.is_none() {
            return Err(DomainError::validation("password is required").into());
        }

        let attributes = self.ensure_password_is_valid(AdminAttributes {
            name: Some(name),
            ..attributes
        })?;
        let admin = self.admins.create(&attributes)?;
        info!(user_id = %admin.id, name = %admin.name, "admin created");
        Ok(admin)
    }

    pub fn update(&self, attributes: AdminAttributes, id: UserId) -> RbacResult<Admin> {
        let id = id.require()?;
        let attributes = self.ensure_password_is_valid(attributes)?;

        let admin = self
            .admins
            .update(id, &attributes)?
            .ok_or_else(|| DomainError::not_found(format!("admin {id}")))?;
        debug!(user_id = %id, "admin updated");
        Ok(admin)
    }

    /// Live, enabled admins.
    pub fn paginate(&self, page: PageRequest) -> RbacResult<Page<Admin>> {
        let query = Query::new()
            .with(&IsDeletedCriteria)
            .with(&StateCriteria::default());

        Ok(self.admins.paginate(&query, page)?)
    }

    /// Apply `attributes` (typically a state change) to every listed admin.
    pub fn batch_update(&self, attributes: AdminAttributes, condition: &BatchWhere) -> RbacResult<u64> {
        let ids = condition.require_ids()?;
        let attributes = self.ensure_password_is_valid(attributes)?;
        let query = Query::new().with(&IdInCriteria::new(ids.iter().copied()));

        Ok(self.admins.update_where(&query, &attributes)?)
    }

    /// Replace the user's roles with the usable subset of `role_id_arr`.
    ///
    /// Disabled, soft-deleted and unknown role ids are dropped without error.
    pub fn allot_role(&self, user_id: UserId, role_id_arr: &[RoleId]) -> RbacResult<bool> {
        let user_id = user_id.require()?;

        let admin = self
            .admins
            .find(user_id)?
            .ok_or_else(|| DomainError::not_found(format!("admin {user_id}")))?;

        let columns = Columns::only([RoleColumn::IsDeleted, RoleColumn::Id, RoleColumn::State]);
        let role_ids: Vec<RoleId> = self
            .role_service
            .get_role_collection_by_id_arr(role_id_arr, &columns)?
            .into_iter()
            .filter(Role::is_normality)
            .map(|role| role.id())
            .collect();

        if role_ids.len() < role_id_arr.len() {
            debug!(
                user_id = %user_id,
                requested = role_id_arr.len(),
                kept = role_ids.len(),
                "dropped unusable role ids"
            );
        }

        let status = self.admins.allot_role(user_id, &role_ids)?;

        self.publish(UserRoleChanged::new(admin, role_ids));

        info!(user_id = %user_id, status, "roles allotted");
        Ok(status)
    }

    /// Clear every role of the user. An unset id is a no-op returning `false`.
    pub fn delete_by_user_id(&self, user_id: UserId) -> RbacResult<bool> {
        if user_id.is_unset() {
            return Ok(false);
        }
        Ok(self.admins.clear_role_by_user_id(user_id)?)
    }

    /// Linked roles as stored, including disabled or deleted ones.
    pub fn get_role_by_user_id(&self, user_id: UserId) -> RbacResult<Vec<Role>> {
        Ok(self.admins.get_role_collection_by_user_id(user_id)?)
    }

    /// Permissions of every linked role, deduplicated. Role state is not consulted.
    pub fn get_permission_by_user_id(&self, user_id: UserId) -> RbacResult<Vec<Permission>> {
        let role_ids: Vec<RoleId> = self
            .get_role_by_user_id(user_id)?
            .into_iter()
            .map(|role| role.id())
            .collect();

        self.role_service.get_permission_collection_by_role_id_arr(&role_ids)
    }

    /// Like [`Self::get_permission_by_user_id`] but only through usable roles.
    pub fn get_effective_permission_by_user_id(&self, user_id: UserId) -> RbacResult<Vec<Permission>> {
        let role_ids: Vec<RoleId> = self
            .get_role_by_user_id(user_id)?
            .into_iter()
            .filter(Role::is_normality)
            .map(|role| role.id())
            .collect();

        self.role_service.get_permission_collection_by_role_id_arr(&role_ids)
    }

    pub fn check_permission(&self, user_id: UserId, path: &str) -> RbacResult<bool> {
        let granted = self.get_effective_permission_by_user_id(user_id)?;
        match authorize(&granted, path) {
            Ok(()) => Ok(true),
            Err(err) => {
                debug!(user_id = %user_id, error = %err, "permission denied");
                Ok(false)
            }
        }
    }

    /// Explain whether the user may access `path`, using effective permissions.
    pub fn explain_permission(&self, user_id: UserId, path: &str) -> RbacResult<AuthorizationExplanation> {
        let granted = self.get_effective_permission_by_user_id(user_id)?;
        Ok(explain_authorization(user_id, &granted, path))
    }

    /// Fire-and-forget: a failed publish is logged, never returned.
    fn publish<E>(&self, event: E)
    where
        E: Event,
        B: EventBus<E>,
    {
        let event_type = event.event_type();
        let occurred_at = event.occurred_at();
        match <B as EventBus<E>>::publish(&self.bus, event) {
            Ok(()) => debug!(event_type, %occurred_at, "event published"),
            Err(err) => warn!(event_type, %occurred_at, error = %err, "failed to publish event"),
        }
    }

    /// Validate and hash a submitted password; attributes without one pass through.
    fn ensure_password_is_valid(&self, mut attributes: AdminAttributes) -> RbacResult<AdminAttributes> {
        if let Some(plain) = attributes.password.take() {
            self.policy.validate(&plain)?;
            attributes.password = Some(self.hasher.hash(&plain)?);
        }
        Ok(attributes)
    }
}
