//! API key endpoints for the signed-in user

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::Caller;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::api_key::{
    ApiKey, ApiKeyId, ApiKeyUpdate, ApiKeyValidationError, Environment, NewApiKey,
    display_secret,
};

fn parse_environment(value: Option<String>) -> Result<Option<Environment>, ApiError> {
    value
        .map(|v| v.parse::<Environment>())
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}

fn parse_key_id(value: &str) -> Result<ApiKeyId, ApiError> {
    value
        .parse()
        .map_err(|e: ApiKeyValidationError| ApiError::bad_request(e.to_string()))
}

/// Request to create a new API key
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
    #[serde(default, alias = "type")]
    pub environment: Option<String>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub pii_enabled: Option<bool>,
}

impl CreateApiKeyRequest {
    fn into_new_key(self) -> Result<NewApiKey, ApiError> {
        let mut request = NewApiKey::new(self.name);
        if let Some(environment) = parse_environment(self.environment)? {
            request = request.with_environment(environment);
        }
        if let Some(limit) = self.usage_limit {
            request = request.with_usage_limit(limit);
        }
        if let Some(pii_enabled) = self.pii_enabled {
            request = request.with_pii_enabled(pii_enabled);
        }
        Ok(request)
    }
}

/// Request to edit an API key; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApiKeyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "type")]
    pub environment: Option<String>,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub pii_enabled: Option<bool>,
}

impl UpdateApiKeyRequest {
    fn into_update(self) -> Result<ApiKeyUpdate, ApiError> {
        Ok(ApiKeyUpdate {
            name: self.name,
            environment: parse_environment(self.environment)?,
            usage_limit: self.usage_limit,
            pii_enabled: self.pii_enabled,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListApiKeysQuery {
    /// Show full secrets instead of masked ones
    #[serde(default)]
    pub reveal: bool,
}

/// API key as shown to its owner
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    /// Secret, masked unless revealed
    pub key: String,
    #[serde(rename = "type")]
    pub environment: Environment,
    pub usage: u64,
    pub usage_limit: u32,
    pub pii_enabled: bool,
    pub created_at: String,
}

impl ApiKeyResponse {
    pub fn from_key(key: &ApiKey, revealed: bool) -> Self {
        Self {
            id: key.id().to_string(),
            name: key.name().to_string(),
            key: display_secret(key.secret(), revealed),
            environment: key.environment(),
            usage: key.usage_count(),
            usage_limit: key.usage_limit(),
            pii_enabled: key.pii_enabled(),
            created_at: key.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeyResponse>,
    pub total: usize,
}

/// GET /api/keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListApiKeysQuery>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    debug!(reveal = query.reveal, "Listing API keys");

    let keys = state.api_keys.fetch_keys(caller.owner()).await?;
    let api_keys: Vec<ApiKeyResponse> = keys
        .iter()
        .map(|k| ApiKeyResponse::from_key(k, query.reveal))
        .collect();
    let total = api_keys.len();

    Ok(Json(ListApiKeysResponse { api_keys, total }))
}

/// POST /api/keys
///
/// The response carries the full secret.
pub async fn create_api_key(
    State(state): State<AppState>,
    caller: Caller,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyResponse>), ApiError> {
    let request = request.into_new_key()?;
    let key = state.api_keys.create_key(caller.owner(), request).await?;

    Ok((StatusCode::CREATED, Json(ApiKeyResponse::from_key(&key, true))))
}

/// PATCH /api/keys/{key_id}
pub async fn update_api_key(
    State(state): State<AppState>,
    caller: Caller,
    Path(key_id): Path<String>,
    Json(request): Json<UpdateApiKeyRequest>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let id = parse_key_id(&key_id)?;
    let update = request.into_update()?;
    let key = state.api_keys.update_key(caller.owner(), &id, update).await?;

    Ok(Json(ApiKeyResponse::from_key(&key, false)))
}

/// DELETE /api/keys/{key_id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    caller: Caller,
    Path(key_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_key_id(&key_id)?;
    state.api_keys.delete_key(caller.owner(), &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
