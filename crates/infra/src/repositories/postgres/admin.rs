use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};

use gatekeeper_core::{RoleId, UserId};
use gatekeeper_rbac::{
    Admin, AdminAttributes, AdminRepository, Columns, DeletedState, EnableState, Page, PageRequest, Query,
    RepositoryResult, Role,
};

use super::{block_on, decode_error, map_sqlx_error, push_filters};

const ADMIN_COLUMNS: &str = "id, name, password, state, is_deleted, created_at, updated_at";

/// Postgres-backed admin store (`admins` plus the `admin_roles` join).
#[derive(Debug, Clone)]
pub struct PostgresAdminRepository {
    pool: Arc<PgPool>,
}

impl PostgresAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    pub async fn find(&self, id: UserId) -> RepositoryResult<Option<Admin>> {
        let row = sqlx::query(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_admin", e))?;

        row.map(|row| AdminRow::from_row(&row).map(Admin::from))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_admin", e))
    }

    #[instrument(skip(self, query), fields(page = page.page(), page_size = page.page_size()), err)]
    pub async fn paginate(&self, query: &Query, page: PageRequest) -> RepositoryResult<Page<Admin>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM admins");
        push_filters(&mut count, query);
        let total: i64 = count
            .build()
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_admins", e))?;

        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {ADMIN_COLUMNS} FROM admins"));
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.page_size() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows = builder
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("paginate_admins", e))?;
        let items = rows
            .iter()
            .map(|row| AdminRow::from_row(row).map(Admin::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode_admin", e))?;

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    #[instrument(skip(self, attributes), fields(name = ?attributes.name), err)]
    pub async fn create(&self, attributes: &AdminAttributes) -> RepositoryResult<Admin> {
        let row = sqlx::query(&format!(
            "INSERT INTO admins (name, password, state, is_deleted) VALUES ($1, $2, $3, $4) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(attributes.name.clone().unwrap_or_default())
        .bind(attributes.password.clone().unwrap_or_default())
        .bind(attributes.state.unwrap_or_default().code())
        .bind(attributes.is_deleted.unwrap_or_default().code())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_admin", e))?;

        AdminRow::from_row(&row)
            .map(Admin::from)
            .map_err(|e| map_sqlx_error("decode_admin", e))
    }

    #[instrument(skip(self, attributes), fields(user_id = %id), err)]
    pub async fn update(&self, id: UserId, attributes: &AdminAttributes) -> RepositoryResult<Option<Admin>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE admins SET updated_at = NOW()");
        push_assignments(&mut builder, attributes);
        builder
            .push(" WHERE id = ")
            .push_bind(id.get())
            .push(format!(" RETURNING {ADMIN_COLUMNS}"));

        let row = builder
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_admin", e))?;

        row.map(|row| AdminRow::from_row(&row).map(Admin::from))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_admin", e))
    }

    #[instrument(
        skip(self, query, attributes),
        fields(filters = query.filters().len(), affected = tracing::field::Empty),
        err
    )]
    pub async fn update_where(&self, query: &Query, attributes: &AdminAttributes) -> RepositoryResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE admins SET updated_at = NOW()");
        push_assignments(&mut builder, attributes);
        push_filters(&mut builder, query);

        let result = builder
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_admins", e))?;

        Span::current().record("affected", result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Replace the user's role links inside one transaction.
    #[instrument(skip(self, role_ids), fields(user_id = %user_id, count = role_ids.len()), err)]
    pub async fn allot_role(&self, user_id: UserId, role_ids: &[RoleId]) -> RepositoryResult<bool> {
        let ids: Vec<i64> = role_ids.iter().map(|id| id.get()).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("DELETE FROM admin_roles WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("clear_admin_roles", e))?;

        if !ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO admin_roles (user_id, role_id)
                SELECT $1, UNNEST($2::BIGINT[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id.get())
            .bind(&ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_admin_roles", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(true)
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn clear_role_by_user_id(&self, user_id: UserId) -> RepositoryResult<bool> {
        sqlx::query("DELETE FROM admin_roles WHERE user_id = $1")
            .bind(user_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear_admin_roles", e))?;
        Ok(true)
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn get_role_collection_by_user_id(&self, user_id: UserId) -> RepositoryResult<Vec<Role>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.name, r.state, r.is_deleted, r.created_at, r.updated_at
            FROM roles r
            JOIN admin_roles ar ON ar.role_id = r.id
            WHERE ar.user_id = $1
            ORDER BY r.id ASC
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_admin_roles", e))?;

        rows.iter()
            .map(|row| super::role::role_from_row(row, &Columns::All))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode_role", e))
    }
}

fn push_assignments(builder: &mut QueryBuilder<'_, Postgres>, attributes: &AdminAttributes) {
    if let Some(name) = &attributes.name {
        builder.push(", name = ").push_bind(name.clone());
    }
    if let Some(password) = &attributes.password {
        builder.push(", password = ").push_bind(password.clone());
    }
    if let Some(state) = attributes.state {
        builder.push(", state = ").push_bind(state.code());
    }
    if let Some(is_deleted) = attributes.is_deleted {
        builder.push(", is_deleted = ").push_bind(is_deleted.code());
    }
}

impl AdminRepository for PostgresAdminRepository {
    fn find(&self, id: UserId) -> RepositoryResult<Option<Admin>> {
        block_on(self.find(id))
    }

    fn paginate(&self, query: &Query, page: PageRequest) -> RepositoryResult<Page<Admin>> {
        block_on(self.paginate(query, page))
    }

    fn create(&self, attributes: &AdminAttributes) -> RepositoryResult<Admin> {
        block_on(self.create(attributes))
    }

    fn update(&self, id: UserId, attributes: &AdminAttributes) -> RepositoryResult<Option<Admin>> {
        block_on(self.update(id, attributes))
    }

    fn update_where(&self, query: &Query, attributes: &AdminAttributes) -> RepositoryResult<u64> {
        block_on(self.update_where(query, attributes))
    }

    fn allot_role(&self, user_id: UserId, role_ids: &[RoleId]) -> RepositoryResult<bool> {
        block_on(self.allot_role(user_id, role_ids))
    }

    fn clear_role_by_user_id(&self, user_id: UserId) -> RepositoryResult<bool> {
        block_on(self.clear_role_by_user_id(user_id))
    }

    fn get_role_collection_by_user_id(&self, user_id: UserId) -> RepositoryResult<Vec<Role>> {
        block_on(self.get_role_collection_by_user_id(user_id))
    }
}

// SQLx row types

#[derive(Debug)]
struct AdminRow {
    id: i64,
    name: String,
    password: String,
    state: EnableState,
    is_deleted: DeletedState,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl<'r> FromRow<'r, PgRow> for AdminRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(AdminRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            password: row.try_get("password")?,
            state: EnableState::try_from(row.try_get::<i16, _>("state")?).map_err(decode_error)?,
            is_deleted: DeletedState::try_from(row.try_get::<i16, _>("is_deleted")?).map_err(decode_error)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Admin {
            id: UserId::new(row.id),
            name: row.name,
            password: row.password,
            state: row.state,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
