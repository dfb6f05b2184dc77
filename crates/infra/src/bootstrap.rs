//! Service wiring: pick adapters from config and assemble the RBAC services.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use gatekeeper_core::DomainResult;
use gatekeeper_events::EventBus;
use gatekeeper_rbac::{
    AdminRepository, PageRequest, PermissionRepository, RolePermissionRepository, RoleRepository, RoleService,
    UserRoleChanged, UserService,
};

use crate::config::InfraConfig;
use crate::password::Argon2PasswordHasher;
use crate::repositories::{
    InMemoryAdminRepository, InMemoryPermissionRepository, InMemoryRolePermissionRepository,
    InMemoryRoleRepository, PostgresAdminRepository, PostgresPermissionRepository,
    PostgresRolePermissionRepository, PostgresRoleRepository,
};

/// Handles to the in-memory stores, kept so tests/dev tooling can seed them.
#[derive(Clone)]
pub struct InMemoryStores {
    pub roles: Arc<InMemoryRoleRepository>,
    pub role_permissions: Arc<InMemoryRolePermissionRepository>,
    pub permissions: Arc<InMemoryPermissionRepository>,
    pub admins: Arc<InMemoryAdminRepository>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        let roles = Arc::new(InMemoryRoleRepository::new());
        let admins = Arc::new(InMemoryAdminRepository::new(roles.clone()));
        Self {
            roles,
            role_permissions: Arc::new(InMemoryRolePermissionRepository::new()),
            permissions: Arc::new(InMemoryPermissionRepository::new()),
            admins,
        }
    }
}

impl Default for InMemoryStores {
    fn default() -> Self {
        Self::new()
    }
}

/// The assembled service layer.
pub struct Services<B> {
    pub roles: Arc<RoleService>,
    pub users: UserService<B>,
    default_page_size: u64,
}

impl<B> Services<B>
where
    B: EventBus<UserRoleChanged>,
{
    pub fn in_memory(config: &InfraConfig, stores: &InMemoryStores, bus: B) -> Self {
        Self::wire(
            config,
            stores.roles.clone(),
            stores.role_permissions.clone(),
            stores.permissions.clone(),
            stores.admins.clone(),
            bus,
        )
    }

    pub fn postgres(config: &InfraConfig, pool: PgPool, bus: B) -> Self {
        Self::wire(
            config,
            Arc::new(PostgresRoleRepository::new(pool.clone())),
            Arc::new(PostgresRolePermissionRepository::new(pool.clone())),
            Arc::new(PostgresPermissionRepository::new(pool.clone())),
            Arc::new(PostgresAdminRepository::new(pool)),
            bus,
        )
    }

    /// Postgres when a database URL is configured, fresh in-memory stores otherwise.
    pub async fn from_config(config: &InfraConfig, bus: B) -> anyhow::Result<Self> {
        if config.database_url.is_some() {
            let pool = config.connect_pool().await?;
            info!(max_connections = config.db_max_connections, "using postgres stores");
            Ok(Self::postgres(config, pool, bus))
        } else {
            info!("using in-memory stores");
            Ok(Self::in_memory(config, &InMemoryStores::new(), bus))
        }
    }

    fn wire(
        config: &InfraConfig,
        roles: Arc<dyn RoleRepository>,
        role_permissions: Arc<dyn RolePermissionRepository>,
        permissions: Arc<dyn PermissionRepository>,
        admins: Arc<dyn AdminRepository>,
        bus: B,
    ) -> Self {
        let role_service = Arc::new(RoleService::new(roles, role_permissions, permissions));
        let users = UserService::new(
            admins,
            role_service.clone(),
            Arc::new(Argon2PasswordHasher::new()),
            config.password_policy(),
            bus,
        );
        Self {
            roles: role_service,
            users,
            default_page_size: config.default_page_size,
        }
    }

    /// Page request from raw listing parameters, using the configured default size.
    pub fn page_request(&self, page: Option<u64>, page_size: Option<u64>) -> DomainResult<PageRequest> {
        PageRequest::from_parts(page, page_size, self.default_page_size)
    }
}
