//! API key store over the hosted data service's PostgREST interface

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;

use super::row::{ApiKeyPatch, ApiKeyRow, rows_into_keys};
use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStore, ApiKeyUpdate, OwnerScope};
use crate::domain::StoreError;

const RETURN_REPRESENTATION: &str = "return=representation";

/// Connection settings for a PostgREST endpoint
#[derive(Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://project.supabase.co`
    pub url: String,
    /// Service role key sent as `apikey` and bearer token
    pub service_key: String,
    pub table: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for PostgrestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestConfig")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PostgrestConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            table: "api_keys".to_string(),
            timeout_secs: 30,
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url.trim_end_matches('/'), self.table)
    }
}

/// API key store talking to `/rest/v1/{table}`
pub struct PostgrestApiKeyStore {
    client: Client,
    table_url: String,
    service_key: String,
}

impl fmt::Debug for PostgrestApiKeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestApiKeyStore")
            .field("table_url", &self.table_url)
            .finish()
    }
}

fn eq(value: impl fmt::Display) -> String {
    format!("eq.{}", value)
}

impl PostgrestApiKeyStore {
    pub fn new(config: &PostgrestConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::backend_with("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            table_url: config.table_url(),
            service_key: config.service_key.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Adds the id filter plus the owner filter for scoped requests
    fn scoped(request: RequestBuilder, id: &ApiKeyId, scope: &OwnerScope) -> RequestBuilder {
        let request = request.query(&[("id", eq(id))]);
        match scope {
            OwnerScope::Owner(owner) => request.query(&[("user_id", eq(owner))]),
            _ => request,
        }
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| StoreError::backend_with(context.to_string(), e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT {
            Err(StoreError::conflict(format!("{}: {}", context, body)))
        } else {
            Err(StoreError::backend(format!(
                "{}: HTTP {}: {}",
                context, status, body
            )))
        }
    }

    async fn rows(&self, request: RequestBuilder, context: &str) -> Result<Vec<ApiKeyRow>, StoreError> {
        self.send(request, context)
            .await?
            .json::<Vec<ApiKeyRow>>()
            .await
            .map_err(|e| StoreError::backend_with(format!("{}: unexpected response", context), e))
    }
}

#[async_trait]
impl ApiKeyStore for PostgrestApiKeyStore {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<ApiKey>, StoreError> {
        let mut request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        match scope {
            OwnerScope::Nobody => return Ok(Vec::new()),
            OwnerScope::Owner(owner) => request = request.query(&[("user_id", eq(owner))]),
            OwnerScope::Everyone => {}
        }

        let rows = self.rows(request, "Failed to list API keys").await?;
        debug!(count = rows.len(), "Fetched API key rows");
        Ok(rows_into_keys(rows))
    }

    async fn insert(&self, api_key: ApiKey) -> Result<ApiKey, StoreError> {
        let request = self
            .client
            .post(&self.table_url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&ApiKeyRow::from(&api_key));

        let row = self
            .rows(request, "Failed to insert API key")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::backend("Insert returned no record"))?;

        ApiKey::try_from(row)
    }

    async fn update_fields(
        &self,
        id: &ApiKeyId,
        scope: &OwnerScope,
        update: &ApiKeyUpdate,
    ) -> Result<ApiKey, StoreError> {
        if *scope == OwnerScope::Nobody {
            return Err(StoreError::not_found(format!("API key '{}' not found", id)));
        }

        let request = self
            .client
            .patch(&self.table_url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&ApiKeyPatch::from(update));
        let request = Self::scoped(request, id, scope);

        let row = self
            .rows(request, "Failed to update API key")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(format!("API key '{}' not found", id)))?;

        ApiKey::try_from(row)
    }

    async fn remove(&self, id: &ApiKeyId, scope: &OwnerScope) -> Result<bool, StoreError> {
        if *scope == OwnerScope::Nobody {
            return Ok(false);
        }

        let request = self
            .client
            .delete(&self.table_url)
            .header("Prefer", RETURN_REPRESENTATION);
        let request = Self::scoped(request, id, scope);

        let deleted = self.rows(request, "Failed to delete API key").await?;
        Ok(!deleted.is_empty())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let request = self
            .client
            .get(&self.table_url)
            .query(&[("select", "id"), ("limit", "1")]);

        self.send(request, "Data service is unreachable").await?;
        Ok(())
    }
}
