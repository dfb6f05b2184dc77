//! Adapters for the RBAC repository ports.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{
    InMemoryAdminRepository, InMemoryPermissionRepository, InMemoryRolePermissionRepository,
    InMemoryRoleRepository,
};
pub use postgres::{
    PostgresAdminRepository, PostgresPermissionRepository, PostgresRolePermissionRepository,
    PostgresRoleRepository,
};
