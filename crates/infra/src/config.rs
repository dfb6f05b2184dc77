//! Configuration loading and representation.

use anyhow::{Context, bail};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use gatekeeper_rbac::password::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH};
use gatekeeper_rbac::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PasswordPolicy};

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS: &str = "GATEKEEPER_DB_MAX_CONNECTIONS";
pub const DEFAULT_PAGE_SIZE_VAR: &str = "GATEKEEPER_DEFAULT_PAGE_SIZE";
pub const PASSWORD_MIN_LENGTH: &str = "GATEKEEPER_PASSWORD_MIN_LENGTH";
pub const PASSWORD_MAX_LENGTH: &str = "GATEKEEPER_PASSWORD_MAX_LENGTH";

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Runtime settings for the storage and service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfraConfig {
    /// Postgres connection string; `None` selects the in-memory adapters.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub default_page_size: u64,
    pub password_min_length: usize,
    pub password_max_length: usize,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            default_page_size: DEFAULT_PAGE_SIZE,
            password_min_length: DEFAULT_MIN_LENGTH,
            password_max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl InfraConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing keys fall back to defaults,
    /// malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup(DATABASE_URL).filter(|url| !url.trim().is_empty());
        if database_url.is_none() {
            info!("{DATABASE_URL} not set; using in-memory stores");
        }

        let config = Self {
            database_url,
            db_max_connections: parse_or(&lookup, DB_MAX_CONNECTIONS, defaults.db_max_connections)?,
            default_page_size: parse_or(&lookup, DEFAULT_PAGE_SIZE_VAR, defaults.default_page_size)?,
            password_min_length: parse_or(&lookup, PASSWORD_MIN_LENGTH, defaults.password_min_length)?,
            password_max_length: parse_or(&lookup, PASSWORD_MAX_LENGTH, defaults.password_max_length)?,
        };

        if config.db_max_connections == 0 {
            bail!("{DB_MAX_CONNECTIONS} must be greater than zero");
        }
        if config.default_page_size == 0 || config.default_page_size > MAX_PAGE_SIZE {
            bail!("{DEFAULT_PAGE_SIZE_VAR} must be between 1 and {MAX_PAGE_SIZE}");
        }
        if config.password_max_length < config.password_min_length {
            bail!("{PASSWORD_MAX_LENGTH} must not be below {PASSWORD_MIN_LENGTH}");
        }

        Ok(config)
    }

    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy::new(self.password_min_length, self.password_max_length)
    }

    /// Open a Postgres pool. Errors when no database URL is configured.
    pub async fn connect_pool(&self) -> anyhow::Result<PgPool> {
        let url = self
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set to use the Postgres stores")?;

        PgPoolOptions::new()
            .max_connections(self.db_max_connections)
            .connect(url)
            .await
            .context("failed to connect to Postgres")
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has invalid value '{raw}'")),
        None => {
            warn!(key, %default, "not set; using default");
            Ok(default)
        }
    }
}
