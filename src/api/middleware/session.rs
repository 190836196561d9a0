//! Caller identity extraction from session tokens

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::OwnerId;

/// The caller behind a request, if any.
///
/// A request without an `Authorization` header is anonymous. A bearer token
/// that fails verification is rejected with 401.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Option<OwnerId>);

impl Caller {
    pub fn owner(&self) -> Option<&OwnerId> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers)? else {
            return Ok(Caller(None));
        };

        let owner = state.sessions.verify(&token)?;
        debug!(owner = %owner, "Session verified");

        Ok(Caller(Some(owner)))
    }
}

/// Bearer token from the Authorization header; `None` when the header is absent
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header encoding"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(ApiError::unauthorized(
            "Expected 'Authorization: Bearer <session token>'",
        )),
    }
}
