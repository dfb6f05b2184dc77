//! In-memory repositories.
//!
//! Intended for tests/dev. Each store keeps its rows behind one `RwLock`, so
//! every write (including a full role replacement) is atomic with respect to
//! concurrent readers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::Utc;

use gatekeeper_core::{PermissionId, RoleId, UserId};
use gatekeeper_rbac::{
    Admin, AdminAttributes, AdminRepository, Columns, DeletedState, IdInCriteria, LinkConditions, Page, PageRequest,
    Permission, PermissionRepository, Query, RepositoryError, RepositoryResult, Role, RoleAttributes,
    RolePermissionRepository, RoleRepository,
};

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

#[derive(Debug)]
struct Table<K, V> {
    next_id: i64,
    rows: BTreeMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Role rows, ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    inner: RwLock<Table<RoleId, Role>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleRepository for InMemoryRoleRepository {
    fn find(&self, id: RoleId, columns: &Columns) -> RepositoryResult<Option<Role>> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table.rows.get(&id).cloned().map(|r| r.project(columns)))
    }

    fn find_where(&self, query: &Query, columns: &Columns) -> RepositoryResult<Vec<Role>> {
        let table = self.inner.read().map_err(|_| poisoned())?;
        Ok(table
            .rows
            .values()
            .filter(|r| query.matches(*r))
            .cloned()
            .map(|r| r.project(columns))
            .collect())
    }

    fn paginate(&self, query: &Query, page: PageRequest, columns: &Columns) -> RepositoryResult<Page<Role>> {
        let matching = self.find_where(query, columns)?;
        Ok(Page::from_filtered(matching, page))
    }

    fn create(&self, attributes: &RoleAttributes) -> RepositoryResult<Role> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;

        if let Some(name) = &attributes.name {
            let taken = table
                .rows
                .values()
                .any(|r| r.is_deleted == DeletedState::NotDeleted && &r.name == name);
            if taken && attributes.is_deleted.is_none_or(|d| d == DeletedState::NotDeleted) {
                return Err(RepositoryError::Conflict(format!("role name '{name}' exists")));
            }
        }

        let id = RoleId::new(table.allocate());
        let now = Utc::now();
        let mut role = Role::new(id, String::new());
        attributes.apply_to(&mut role);
        role.created_at = Some(now);
        role.updated_at = Some(now);

        table.rows.insert(id, role.clone());
        Ok(role)
    }

    fn update(&self, id: RoleId, attributes: &RoleAttributes) -> RepositoryResult<Option<Role>> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let Some(mut role) = table.rows.get(&id).cloned() else {
            return Ok(None);
        };
        attributes.apply_to(&mut role);
        ensure_live_names_unique(&table.rows, std::slice::from_ref(&role))?;

        role.updated_at = Some(Utc::now());
        table.rows.insert(id, role.clone());
        Ok(Some(role))
    }

    fn update_where(&self, query: &Query, attributes: &RoleAttributes) -> RepositoryResult<u64> {
        let mut table = self.inner.write().map_err(|_| poisoned())?;
        let now = Utc::now();
        let patched: Vec<Role> = table
            .rows
            .values()
            .filter(|r| query.matches(*r))
            .cloned()
            .map(|mut role| {
                attributes.apply_to(&mut role);
                role.updated_at = Some(now);
                role
            })
            .collect();
        ensure_live_names_unique(&table.rows, &patched)?;

        let affected = patched.len() as u64;
        for role in patched {
            table.rows.insert(role.id, role);
        }
        Ok(affected)
    }
}

/// Reject a write that would leave two live roles sharing a name.
fn ensure_live_names_unique(rows: &BTreeMap<RoleId, Role>, patched: &[Role]) -> RepositoryResult<()> {
    let patched_ids: BTreeSet<RoleId> = patched.iter().map(|r| r.id).collect();
    let mut names = HashSet::new();

    let untouched = rows.values().filter(|r| !patched_ids.contains(&r.id));
    for role in patched.iter().chain(untouched) {
        if role.is_deleted == DeletedState::NotDeleted && !names.insert(role.name.as_str()) {
            return Err(RepositoryError::Conflict(format!("role name '{}' exists", role.name)));
        }
    }
    Ok(())
}

/// `(role_id, permission_id)` pairs.
#[derive(Debug, Default)]
pub struct InMemoryRolePermissionRepository {
    links: RwLock<BTreeSet<(RoleId, PermissionId)>>,
}

impl InMemoryRolePermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single link (seeding helper).
    pub fn link(&self, role_id: RoleId, permission_id: PermissionId) -> RepositoryResult<()> {
        self.links
            .write()
            .map_err(|_| poisoned())?
            .insert((role_id, permission_id));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.links.read().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RolePermissionRepository for InMemoryRolePermissionRepository {
    fn delete_where(&self, conditions: &LinkConditions) -> RepositoryResult<u64> {
        let mut links = self.links.write().map_err(|_| poisoned())?;
        let before = links.len();
        links.retain(|(role_id, permission_id)| !conditions.matches(*role_id, *permission_id));
        Ok((before - links.len()) as u64)
    }

    fn get_permission_id_arr_by_role_id(&self, role_id: RoleId) -> RepositoryResult<Vec<PermissionId>> {
        let links = self.links.read().map_err(|_| poisoned())?;
        Ok(links
            .range((role_id, PermissionId::new(i64::MIN))..=(role_id, PermissionId::new(i64::MAX)))
            .map(|(_, permission_id)| *permission_id)
            .collect())
    }

    fn replace_permissions(&self, role_id: RoleId, permission_ids: &[PermissionId]) -> RepositoryResult<u64> {
        let mut links = self.links.write().map_err(|_| poisoned())?;
        links.retain(|(r, _)| *r != role_id);

        let mut written = 0;
        for permission_id in permission_ids {
            if links.insert((role_id, *permission_id)) {
                written += 1;
            }
        }
        Ok(written)
    }
}

/// Permission catalogue keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    rows: RwLock<HashMap<PermissionId, Permission>>,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            rows: RwLock::new(permissions.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    pub fn insert(&self, permission: Permission) -> RepositoryResult<()> {
        self.rows
            .write()
            .map_err(|_| poisoned())?
            .insert(permission.id, permission);
        Ok(())
    }
}

impl PermissionRepository for InMemoryPermissionRepository {
    fn find_many(&self, ids: &[PermissionId]) -> RepositoryResult<Vec<Permission>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }
}

#[derive(Debug, Default)]
struct AdminTables {
    admins: Table<UserId, Admin>,
    user_roles: BTreeMap<UserId, BTreeSet<RoleId>>,
}

/// Admin rows plus the user ↔ role join.
///
/// Linked roles are read back through the role repository, so the two must
/// share the same role store.
pub struct InMemoryAdminRepository {
    inner: RwLock<AdminTables>,
    roles: Arc<dyn RoleRepository>,
}

impl InMemoryAdminRepository {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self {
            inner: RwLock::new(AdminTables::default()),
            roles,
        }
    }

    /// Raw linked role ids, ascending.
    pub fn role_ids_of(&self, user_id: UserId) -> RepositoryResult<Vec<RoleId>> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables
            .user_roles
            .get(&user_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default())
    }
}

impl AdminRepository for InMemoryAdminRepository {
    fn find(&self, id: UserId) -> RepositoryResult<Option<Admin>> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        Ok(tables.admins.rows.get(&id).cloned())
    }

    fn paginate(&self, query: &Query, page: PageRequest) -> RepositoryResult<Page<Admin>> {
        let tables = self.inner.read().map_err(|_| poisoned())?;
        let matching: Vec<Admin> = tables
            .admins
            .rows
            .values()
            .filter(|a| query.matches(*a))
            .cloned()
            .collect();
        Ok(Page::from_filtered(matching, page))
    }

    fn create(&self, attributes: &AdminAttributes) -> RepositoryResult<Admin> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;

        let id = UserId::new(tables.admins.allocate());
        let now = Utc::now();
        let mut admin = Admin::new(id, String::new());
        attributes.apply_to(&mut admin);
        admin.created_at = Some(now);
        admin.updated_at = Some(now);

        tables.admins.rows.insert(id, admin.clone());
        Ok(admin)
    }

    fn update(&self, id: UserId, attributes: &AdminAttributes) -> RepositoryResult<Option<Admin>> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        Ok(tables.admins.rows.get_mut(&id).map(|admin| {
            attributes.apply_to(admin);
            admin.updated_at = Some(Utc::now());
            admin.clone()
        }))
    }

    fn update_where(&self, query: &Query, attributes: &AdminAttributes) -> RepositoryResult<u64> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        let now = Utc::now();
        let mut affected = 0;
        for admin in tables.admins.rows.values_mut().filter(|a| query.matches(&**a)) {
            attributes.apply_to(admin);
            admin.updated_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }

    fn allot_role(&self, user_id: UserId, role_ids: &[RoleId]) -> RepositoryResult<bool> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        if role_ids.is_empty() {
            tables.user_roles.remove(&user_id);
        } else {
            tables
                .user_roles
                .insert(user_id, role_ids.iter().copied().collect());
        }
        Ok(true)
    }

    fn clear_role_by_user_id(&self, user_id: UserId) -> RepositoryResult<bool> {
        let mut tables = self.inner.write().map_err(|_| poisoned())?;
        tables.user_roles.remove(&user_id);
        Ok(true)
    }

    fn get_role_collection_by_user_id(&self, user_id: UserId) -> RepositoryResult<Vec<Role>> {
        let role_ids = self.role_ids_of(user_id)?;
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new().with(&IdInCriteria::new(role_ids));
        self.roles.find_where(&query, &Columns::All)
    }
}
