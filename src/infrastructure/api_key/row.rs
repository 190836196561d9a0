//! Persisted shape of a key record in the `api_keys` table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::api_key::{
    ApiKey, ApiKeyId, ApiKeyUpdate, DEFAULT_USAGE_LIMIT, Environment, OwnerId,
};
use crate::domain::StoreError;

fn default_usage_limit() -> i64 {
    i64::from(DEFAULT_USAGE_LIMIT)
}

/// One row of the `api_keys` table, shared by the SQL and REST backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ApiKeyRow {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    pub user_id: Option<Uuid>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub usage: i64,
    #[serde(default = "default_usage_limit")]
    pub usage_limit: i64,
    #[serde(default)]
    pub pii_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&ApiKey> for ApiKeyRow {
    fn from(key: &ApiKey) -> Self {
        Self {
            id: *key.id().as_uuid(),
            name: key.name().to_string(),
            key: key.secret().to_string(),
            user_id: Some(*key.owner().as_uuid()),
            key_type: key.environment().to_string(),
            usage: i64::try_from(key.usage_count()).unwrap_or(i64::MAX),
            usage_limit: i64::from(key.usage_limit()),
            pii_enabled: key.pii_enabled(),
            created_at: key.created_at(),
        }
    }
}

impl TryFrom<ApiKeyRow> for ApiKey {
    type Error = StoreError;

    fn try_from(row: ApiKeyRow) -> Result<Self, Self::Error> {
        let owner = row
            .user_id
            .map(OwnerId::new)
            .ok_or_else(|| StoreError::backend(format!("API key '{}' has no owner", row.id)))?;

        let environment: Environment = row
            .key_type
            .parse()
            .map_err(|e| StoreError::backend_with(format!("API key '{}' is malformed", row.id), e))?;

        let usage_count = u64::try_from(row.usage).map_err(|_| {
            StoreError::backend(format!("API key '{}' has negative usage", row.id))
        })?;

        let usage_limit = u32::try_from(row.usage_limit).map_err(|_| {
            StoreError::backend(format!(
                "API key '{}' has out of range usage limit {}",
                row.id, row.usage_limit
            ))
        })?;

        Ok(ApiKey::new(
            ApiKeyId::new(row.id),
            row.name,
            row.key,
            owner,
            environment,
        )
        .with_usage_count(usage_count)
        .with_usage_limit(usage_limit)
        .with_pii_enabled(row.pii_enabled)
        .with_created_at(row.created_at))
    }
}

/// Column changes for a partial update, omitting untouched columns
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApiKeyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pii_enabled: Option<bool>,
}

impl From<&ApiKeyUpdate> for ApiKeyPatch {
    fn from(update: &ApiKeyUpdate) -> Self {
        Self {
            name: update.name.clone(),
            key_type: update.environment.map(|e| e.to_string()),
            usage_limit: update.usage_limit.map(i64::from),
            pii_enabled: update.pii_enabled,
        }
    }
}

/// Convert fetched rows, keeping their order
/// Converts listed rows, skipping those that do not form a valid key
pub(crate) fn rows_into_keys(rows: Vec<ApiKeyRow>) -> Vec<ApiKey> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match ApiKey::try_from(row) {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(key_id = %id, error = %e, "Skipping malformed API key row");
                    None
                }
            }
        })
        .collect()
}
