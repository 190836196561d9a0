//! PostgreSQL API key store with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use super::row::{ApiKeyPatch, ApiKeyRow, rows_into_keys};
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStore, ApiKeyUpdate, OwnerScope};
use crate::domain::StoreError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/keydesk".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }
}

fn map_sqlx_error(context: &str, error: sqlx::Error) -> StoreError {
    let unique_violation = error
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());

    if unique_violation {
        StoreError::conflict(format!("{}: duplicate id or key", context))
    } else {
        StoreError::backend_with(context.to_string(), error)
    }
}

/// API key store backed by a typed `api_keys` table
pub struct PostgresApiKeyStore {
    pool: PgPool,
    table_name: String,
}

impl Debug for PostgresApiKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresApiKeyStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PostgresApiKeyStore {
    pub fn new(pool: PgPool, table_name: impl Into<String>) -> Self {
        Self {
            pool,
            table_name: table_name.into(),
        }
    }

    /// Open a connection pool and wrap it in a store
    pub async fn connect(
        config: &PostgresConfig,
        table_name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::backend_with("Failed to connect to PostgreSQL", e))?;

        Ok(Self::new(pool, table_name))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Create the key table and its listing index if missing
    pub async fn ensure_table(&self) -> Result<(), StoreError> {
        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                key TEXT NOT NULL UNIQUE,
                user_id UUID,
                "type" TEXT NOT NULL DEFAULT 'Development',
                usage BIGINT NOT NULL DEFAULT 0,
                usage_limit BIGINT NOT NULL DEFAULT 1000,
                pii_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            table = self.table_name
        );

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_user_created ON {table} (user_id, created_at DESC)",
            table = self.table_name
        );

        for statement in [create_table, create_index] {
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("Failed to create table", e))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ApiKeyStore for PostgresApiKeyStore {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<ApiKey>, StoreError> {
        let rows = match scope {
            OwnerScope::Nobody => return Ok(Vec::new()),
            OwnerScope::Owner(owner) => {
                let query = format!(
                    "SELECT * FROM {} WHERE user_id = $1 ORDER BY created_at DESC",
                    self.table_name
                );
                sqlx::query_as::<_, ApiKeyRow>(&query)
                    .bind(owner.as_uuid())
                    .fetch_all(&self.pool)
                    .await
            }
            OwnerScope::Everyone => {
                let query = format!("SELECT * FROM {} ORDER BY created_at DESC", self.table_name);
                sqlx::query_as::<_, ApiKeyRow>(&query)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error("Failed to list API keys", e))?;

        debug!(count = rows.len(), "Fetched API key rows");
        Ok(rows_into_keys(rows))
    }

    async fn insert(&self, api_key: ApiKey) -> Result<ApiKey, StoreError> {
        let row = ApiKeyRow::from(&api_key);
        let query = format!(
            r#"
            INSERT INTO {} (id, name, key, user_id, "type", usage, usage_limit, pii_enabled, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
            self.table_name
        );

        let stored = sqlx::query_as::<_, ApiKeyRow>(&query)
            .bind(row.id)
            .bind(&row.name)
            .bind(&row.key)
            .bind(row.user_id)
            .bind(&row.key_type)
            .bind(row.usage)
            .bind(row.usage_limit)
            .bind(row.pii_enabled)
            .bind(row.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to insert API key", e))?;

        ApiKey::try_from(stored)
    }

    async fn update_fields(
        &self,
        id: &ApiKeyId,
        scope: &OwnerScope,
        update: &ApiKeyUpdate,
    ) -> Result<ApiKey, StoreError> {
        let owner_filter = match scope {
            OwnerScope::Nobody => {
                return Err(StoreError::not_found(format!("API key '{}' not found", id)));
            }
            OwnerScope::Owner(_) => " AND user_id = $6",
            OwnerScope::Everyone => "",
        };

        let query = format!(
            r#"
            UPDATE {}
            SET name = COALESCE($2, name),
                "type" = COALESCE($3, "type"),
                usage_limit = COALESCE($4, usage_limit),
                pii_enabled = COALESCE($5, pii_enabled)
            WHERE id = $1{}
            RETURNING *
            "#,
            self.table_name, owner_filter
        );

        let patch = ApiKeyPatch::from(update);
        let mut statement = sqlx::query_as::<_, ApiKeyRow>(&query)
            .bind(id.as_uuid())
            .bind(patch.name)
            .bind(patch.key_type)
            .bind(patch.usage_limit)
            .bind(patch.pii_enabled);
        if let OwnerScope::Owner(owner) = scope {
            statement = statement.bind(*owner.as_uuid());
        }

        let row = statement
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Failed to update API key", e))?
            .ok_or_else(|| StoreError::not_found(format!("API key '{}' not found", id)))?;

        ApiKey::try_from(row)
    }

    async fn remove(&self, id: &ApiKeyId, scope: &OwnerScope) -> Result<bool, StoreError> {
        let deleted = match scope {
            OwnerScope::Nobody => return Ok(false),
            OwnerScope::Owner(owner) => {
                let query = format!(
                    "DELETE FROM {} WHERE id = $1 AND user_id = $2 RETURNING id",
                    self.table_name
                );
                sqlx::query_scalar::<_, uuid::Uuid>(&query)
                    .bind(id.as_uuid())
                    .bind(owner.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
            }
            OwnerScope::Everyone => {
                let query = format!("DELETE FROM {} WHERE id = $1 RETURNING id", self.table_name);
                sqlx::query_scalar::<_, uuid::Uuid>(&query)
                    .bind(id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
            }
        }
        .map_err(|e| map_sqlx_error("Failed to delete API key", e))?;

        Ok(deleted.is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("Database is unreachable", e))?;
        Ok(())
    }
}
