//! Postgres-backed repositories.
//!
//! Schema: `crates/infra/sql/schema.sql`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `Conflict` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / decode / IO | N/A | `Storage` |
//!
//! ## Sync bridge
//!
//! The repository ports are synchronous. Each adapter exposes the real work as
//! `async` inherent methods and implements the port by blocking on them, which
//! requires a multi-threaded tokio runtime. Any other context yields
//! `RepositoryError::Storage`.

mod admin;
mod permission;
mod role;

use std::future::Future;

use sqlx::{Postgres, QueryBuilder};
use tokio::runtime::RuntimeFlavor;

use gatekeeper_rbac::{Filter, Query, RepositoryError, RepositoryResult};

pub use admin::PostgresAdminRepository;
pub use permission::{PostgresPermissionRepository, PostgresRolePermissionRepository};
pub use role::PostgresRoleRepository;

/// Run an adapter future to completion from synchronous code.
fn block_on<F, T>(future: F) -> RepositoryResult<T>
where
    F: Future<Output = RepositoryResult<T>>,
{
    let handle = tokio::runtime::Handle::try_current().map_err(|_| {
        RepositoryError::Storage(
            "postgres repositories require a tokio runtime; call from within a runtime context".to_string(),
        )
    })?;
    if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
        return Err(RepositoryError::Storage(
            "postgres repositories require a multi-threaded tokio runtime".to_string(),
        ));
    }
    tokio::task::block_in_place(|| handle.block_on(future))
}

/// Append `query` as a `WHERE` clause. Filters are ANDed in order.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &Query) {
    builder.push(" WHERE TRUE");
    for filter in query.filters() {
        match filter {
            Filter::NotDeleted => {
                builder.push(" AND is_deleted = 0");
            }
            Filter::State(state) => {
                builder.push(" AND state = ").push_bind(state.code());
            }
            Filter::NameEq(name) => {
                builder.push(" AND name = ").push_bind(name.clone());
            }
            Filter::NameLike(fragment) => {
                builder
                    .push(" AND name LIKE ")
                    .push_bind(format!("%{}%", escape_like(fragment)));
            }
            Filter::IdIn(ids) => {
                builder.push(" AND id = ANY(").push_bind(ids.clone()).push(")");
            }
            Filter::IdNot(id) => {
                builder.push(" AND id <> ").push_bind(*id);
            }
        }
    }
}

/// Escape `LIKE` metacharacters (backslash is the Postgres default escape).
fn escape_like(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Map SQLx errors to RepositoryError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => RepositoryError::Conflict(msg),
                _ => RepositoryError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => RepositoryError::Storage(format!("connection pool closed in {operation}")),
        other => RepositoryError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

/// Wrap a domain decoding failure so it can travel through `FromRow`.
fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}
