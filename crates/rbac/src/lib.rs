//! `gatekeeper-rbac`: roles, permissions and admin role assignment.
//!
//! Pure domain and service layer: persistence is reached only through the
//! ports in [`repository`], events only through [`gatekeeper_events::EventBus`].

pub mod admin;
pub mod authorize;
pub mod batch;
pub mod criteria;
pub mod error;
pub mod events;
pub mod page;
pub mod password;
pub mod permission;
pub mod repository;
pub mod role;
pub mod role_service;
pub mod state;
pub mod user_service;

pub use admin::{Admin, AdminAttributes};
pub use authorize::{AuthorizationExplanation, AuthzError, authorize, explain_authorization};
pub use batch::BatchWhere;
pub use criteria::{
    Criteria, Filter, Filterable, IdInCriteria, IsDeletedCriteria, NameCriteria, NameLikeCriteria, Query,
    StateCriteria,
};
pub use error::{RbacError, RbacResult};
pub use events::UserRoleChanged;
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use password::{HashError, PasswordHasher, PasswordPolicy};
pub use permission::Permission;
pub use repository::{
    AdminRepository, LinkConditions, PermissionRepository, RepositoryError, RepositoryResult,
    RolePermissionRepository, RoleRepository,
};
pub use role::{Columns, Role, RoleAttributes, RoleColumn};
pub use role_service::RoleService;
pub use state::{DeletedState, EnableState, is_normality};
pub use user_service::UserService;
