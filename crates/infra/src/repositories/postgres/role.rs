use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{Span, instrument};

use gatekeeper_core::RoleId;
use gatekeeper_rbac::{
    Columns, DeletedState, EnableState, Page, PageRequest, Query, RepositoryResult, Role, RoleAttributes,
    RoleColumn, RoleRepository,
};

use super::{block_on, decode_error, map_sqlx_error, push_filters};

/// Postgres-backed role store (`roles` table).
#[derive(Debug, Clone)]
pub struct PostgresRoleRepository {
    pool: Arc<PgPool>,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    #[instrument(skip(self, columns), fields(role_id = %id), err)]
    pub async fn find(&self, id: RoleId, columns: &Columns) -> RepositoryResult<Option<Role>> {
        let mut builder = select(columns);
        builder.push(" WHERE id = ").push_bind(id.get());

        let row = builder
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_role", e))?;

        row.map(|row| role_from_row(&row, columns))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_role", e))
    }

    #[instrument(
        skip(self, query, columns),
        fields(filters = query.filters().len(), role_count = tracing::field::Empty),
        err
    )]
    pub async fn find_where(&self, query: &Query, columns: &Columns) -> RepositoryResult<Vec<Role>> {
        let mut builder = select(columns);
        push_filters(&mut builder, query);
        builder.push(" ORDER BY id ASC");

        let rows = builder
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_roles", e))?;

        let roles = rows
            .iter()
            .map(|row| role_from_row(row, columns))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode_role", e))?;

        Span::current().record("role_count", roles.len());
        Ok(roles)
    }

    #[instrument(skip(self, query, columns), fields(page = page.page(), page_size = page.page_size()), err)]
    pub async fn paginate(
        &self,
        query: &Query,
        page: PageRequest,
        columns: &Columns,
    ) -> RepositoryResult<Page<Role>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) AS total FROM roles");
        push_filters(&mut count, query);
        let total: i64 = count
            .build()
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_roles", e))?;

        let mut builder = select(columns);
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
            .map_err(|e| map_sqlx_error("paginate_roles", e))?;
        let items = rows
            .iter()
            .map(|row| role_from_row(row, columns))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("decode_role", e))?;

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    #[instrument(skip(self, attributes), fields(name = ?attributes.name), err)]
    pub async fn create(&self, attributes: &RoleAttributes) -> RepositoryResult<Role> {
        let row = sqlx::query(
            r#"
            INSERT INTO roles (name, state, is_deleted)
            VALUES ($1, $2, $3)
            RETURNING id, name, state, is_deleted, created_at, updated_at
            "#,
        )
        .bind(attributes.name.clone().unwrap_or_default())
        .bind(attributes.state.unwrap_or_default().code())
        .bind(attributes.is_deleted.unwrap_or_default().code())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_role", e))?;

        role_from_row(&row, &Columns::All).map_err(|e| map_sqlx_error("decode_role", e))
    }

    #[instrument(skip(self, attributes), fields(role_id = %id), err)]
    pub async fn update(&self, id: RoleId, attributes: &RoleAttributes) -> RepositoryResult<Option<Role>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE roles SET updated_at = NOW()");
        push_assignments(&mut builder, attributes);
        builder
            .push(" WHERE id = ")
            .push_bind(id.get())
            .push(" RETURNING id, name, state, is_deleted, created_at, updated_at");

        let row = builder
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_role", e))?;

        row.map(|row| role_from_row(&row, &Columns::All))
            .transpose()
            .map_err(|e| map_sqlx_error("decode_role", e))
    }

    #[instrument(
        skip(self, query, attributes),
        fields(filters = query.filters().len(), affected = tracing::field::Empty),
        err
    )]
    pub async fn update_where(&self, query: &Query, attributes: &RoleAttributes) -> RepositoryResult<u64> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE roles SET updated_at = NOW()");
        push_assignments(&mut builder, attributes);
        push_filters(&mut builder, query);

        let result = builder
            .build()
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_roles", e))?;

        Span::current().record("affected", result.rows_affected());
        Ok(result.rows_affected())
    }
}

fn select(columns: &Columns) -> QueryBuilder<'static, Postgres> {
    let list: Vec<&str> = columns.selected().into_iter().map(RoleColumn::as_str).collect();
    QueryBuilder::new(format!("SELECT {} FROM roles", list.join(", ")))
}

fn push_assignments(builder: &mut QueryBuilder<'_, Postgres>, attributes: &RoleAttributes) {
    if let Some(name) = &attributes.name {
        builder.push(", name = ").push_bind(name.clone());
    }
    if let Some(state) = attributes.state {
        builder.push(", state = ").push_bind(state.code());
    }
    if let Some(is_deleted) = attributes.is_deleted {
        builder.push(", is_deleted = ").push_bind(is_deleted.code());
    }
}

/// Decode the selected columns; the rest stay at their empty values.
pub(super) fn role_from_row(row: &PgRow, columns: &Columns) -> Result<Role, sqlx::Error> {
    let mut role = Role::new(RoleId::default(), String::new());
    if columns.contains(RoleColumn::Id) {
        role.id = RoleId::new(row.try_get("id")?);
    }
    if columns.contains(RoleColumn::Name) {
        role.name = row.try_get("name")?;
    }
    if columns.contains(RoleColumn::State) {
        role.state = EnableState::try_from(row.try_get::<i16, _>("state")?).map_err(decode_error)?;
    }
    if columns.contains(RoleColumn::IsDeleted) {
        role.is_deleted = DeletedState::try_from(row.try_get::<i16, _>("is_deleted")?).map_err(decode_error)?;
    }
    if columns.contains(RoleColumn::CreatedAt) {
        role.created_at = row.try_get("created_at")?;
    }
    if columns.contains(RoleColumn::UpdatedAt) {
        role.updated_at = row.try_get("updated_at")?;
    }
    Ok(role)
}

impl RoleRepository for PostgresRoleRepository {
    fn find(&self, id: RoleId, columns: &Columns) -> RepositoryResult<Option<Role>> {
        block_on(self.find(id, columns))
    }

    fn find_where(&self, query: &Query, columns: &Columns) -> RepositoryResult<Vec<Role>> {
        block_on(self.find_where(query, columns))
    }

    fn paginate(&self, query: &Query, page: PageRequest, columns: &Columns) -> RepositoryResult<Page<Role>> {
        block_on(self.paginate(query, page, columns))
    }

    fn create(&self, attributes: &RoleAttributes) -> RepositoryResult<Role> {
        block_on(self.create(attributes))
    }

    fn update(&self, id: RoleId, attributes: &RoleAttributes) -> RepositoryResult<Option<Role>> {
        block_on(self.update(id, attributes))
    }

    fn update_where(&self, query: &Query, attributes: &RoleAttributes) -> RepositoryResult<u64> {
        block_on(self.update_where(query, attributes))
    }
}
