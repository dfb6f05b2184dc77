use std::collections::HashMap;
use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use gatekeeper_core::{PermissionId, RoleId};
use gatekeeper_rbac::{
    LinkConditions, Permission, PermissionRepository, RepositoryResult, RolePermissionRepository,
};

use super::{block_on, map_sqlx_error};

/// Postgres-backed role ↔ permission join (`role_permissions` table).
#[derive(Debug, Clone)]
pub struct PostgresRolePermissionRepository {
    pool: Arc<PgPool>,
}

impl PostgresRolePermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    #[instrument(skip(self), err)]
    pub async fn delete_where(&self, conditions: &LinkConditions) -> RepositoryResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("DELETE FROM role_permissions WHERE TRUE");
        if let Some(role_id) = conditions.role_id() {
            builder.push(" AND role_id = ").push_bind(role_id.get());
        }
        if let Some(permission_id) = conditions.permission_id() {
            builder.push(" AND permission_id = ").push_bind(permission_id.get());
        }

        let result = builder
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_role_permissions", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(role_id = %role_id), err)]
    pub async fn get_permission_id_arr_by_role_id(&self, role_id: RoleId) -> RepositoryResult<Vec<PermissionId>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT permission_id
            FROM role_permissions
            WHERE role_id = $1
            ORDER BY permission_id ASC
            "#,
        )
        .bind(role_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_role_permissions", e))?;

        Ok(ids.into_iter().map(PermissionId::new).collect())
    }

    /// Delete then insert inside one transaction.
    #[instrument(skip(self, permission_ids), fields(role_id = %role_id, count = permission_ids.len()), err)]
    pub async fn replace_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> RepositoryResult<u64> {
        let ids: Vec<i64> = permission_ids.iter().map(|id| id.get()).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_role_permissions", e))?;

        let written = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, UNNEST($2::BIGINT[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id.get())
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_role_permissions", e))?
        .rows_affected();

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(written)
    }
}

impl RolePermissionRepository for PostgresRolePermissionRepository {
    fn delete_where(&self, conditions: &LinkConditions) -> RepositoryResult<u64> {
        block_on(self.delete_where(conditions))
    }

    fn get_permission_id_arr_by_role_id(&self, role_id: RoleId) -> RepositoryResult<Vec<PermissionId>> {
        block_on(self.get_permission_id_arr_by_role_id(role_id))
    }

    fn replace_permissions(&self, role_id: RoleId, permission_ids: &[PermissionId]) -> RepositoryResult<u64> {
        block_on(self.replace_permissions(role_id, permission_ids))
    }
}

/// Postgres-backed permission catalogue (`permissions` table).
#[derive(Debug, Clone)]
pub struct PostgresPermissionRepository {
    pool: Arc<PgPool>,
}

impl PostgresPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()), err)]
    pub async fn find_many(&self, ids: &[PermissionId]) -> RepositoryResult<Vec<Permission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();

        let rows = sqlx::query("SELECT id, name, path FROM permissions WHERE id = ANY($1)")
            .bind(&raw)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_permissions", e))?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let permission: Permission = PermissionRow::from_row(row)
                .map_err(|e| map_sqlx_error("decode_permission", e))?
                .into();
            by_id.insert(permission.id, permission);
        }

        Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }
}

impl PermissionRepository for PostgresPermissionRepository {
    fn find_many(&self, ids: &[PermissionId]) -> RepositoryResult<Vec<Permission>> {
        block_on(self.find_many(ids))
    }
}

// SQLx row types

#[derive(Debug)]
struct PermissionRow {
    id: i64,
    name: String,
    path: String,
}

impl<'r> FromRow<'r, PgRow> for PermissionRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(PermissionRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            path: row.try_get("path")?,
        })
    }
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Permission::new(PermissionId::new(row.id), row.name, row.path)
    }
}
