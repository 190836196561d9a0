use axum::extract::State;
use serde::Serialize;

use crate::api::middleware::Caller;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::UsageSummary;

#[derive(Debug, Clone, Serialize)]
pub struct UsageResponse {
    pub total_limit: u64,
    pub total_used: u64,
    pub key_count: usize,
    pub percent_used: f64,
}

impl From<UsageSummary> for UsageResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            total_limit: summary.total_limit,
            total_used: summary.total_used,
            key_count: summary.key_count,
            percent_used: summary.percent_used(),
        }
    }
}

/// GET /api/usage
pub async fn get_usage(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UsageResponse>, ApiError> {
    let summary = state.api_keys.usage_summary(caller.owner()).await?;
    Ok(Json(summary.into()))
}
