//! Endpoints behind the key management dashboard

pub mod api_keys;
pub mod usage;

use axum::{
    Router,
    routing::{get, patch},
};

use super::state::AppState;

/// Routes mounted under `/api`
pub fn create_dashboard_router() -> Router<AppState> {
    Router::new()
        .route(
            "/keys",
            get(api_keys::list_api_keys).post(api_keys::create_api_key),
        )
        .route(
            "/keys/{key_id}",
            patch(api_keys::update_api_key).delete(api_keys::delete_api_key),
        )
        .route("/usage", get(usage::get_usage))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::api::router::create_router_with_state;
    use crate::api::state::AppState;
    use crate::domain::StoreError;
    use crate::domain::api_key::{ApiKeyStore, MockApiKeyStore, OwnerId};
    use crate::domain::session::{MockSessionVerifier, SessionError};
    use crate::infrastructure::api_key::{
        ApiKeyService, InMemoryApiKeyStore, LifecycleConfig, TestingConfig,
    };

    const ALICE: &str = "alice-token";
    const BOB: &str = "bob-token";

    fn alice() -> OwnerId {
        OwnerId::new(Uuid::from_u128(1))
    }

    fn bob() -> OwnerId {
        OwnerId::new(Uuid::from_u128(2))
    }

    fn state_with(testing: TestingConfig) -> AppState {
        let mut sessions = MockSessionVerifier::new();
        sessions.expect_verify().returning(|token| match token {
            ALICE => Ok(alice()),
            BOB => Ok(bob()),
            _ => Err(SessionError::invalid("InvalidSignature")),
        });

        let store: Arc<dyn ApiKeyStore> = Arc::new(InMemoryApiKeyStore::new());
        let service = ApiKeyService::new(store, LifecycleConfig::new(testing));
        AppState::new(Arc::new(service), Arc::new(sessions))
    }

    fn state() -> AppState {
        state_with(TestingConfig::default())
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = create_router_with_state(state.clone())
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(state: &AppState, token: &str, body: Value) -> Value {
        let (status, created) = send(state, "POST", "/api/keys", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        created
    }

    #[tokio::test]
    async fn test_create_returns_full_secret() {
        let state = state();

        let created = create(&state, ALICE, json!({ "name": "test-key" })).await;

        let secret = created["key"].as_str().unwrap();
        assert!(secret.starts_with("dev-"));
        assert_eq!(secret.len(), 4 + 36);
        assert_eq!(created["type"], "Development");
        assert_eq!(created["usage"], 0);
        assert_eq!(created["usage_limit"], 1000);
        assert_eq!(created["pii_enabled"], false);
    }

    #[tokio::test]
    async fn test_list_masks_by_default_and_reveals_on_request() {
        let state = state();
        let created = create(&state, ALICE, json!({ "name": "k", "type": "Production" })).await;
        let secret = created["key"].as_str().unwrap().to_string();

        let (status, listed) = send(&state, "GET", "/api/keys", Some(ALICE), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["total"], 1);
        let masked = listed["api_keys"][0]["key"].as_str().unwrap();
        assert_eq!(masked.chars().count(), 29);
        assert!(masked.starts_with("prod-"));
        assert_ne!(masked, secret);

        let (_, revealed) = send(&state, "GET", "/api/keys?reveal=true", Some(ALICE), None).await;
        assert_eq!(revealed["api_keys"][0]["key"], secret.as_str());
    }

    #[tokio::test]
    async fn test_anonymous_requests() {
        let state = state();
        create(&state, ALICE, json!({ "name": "k" })).await;

        let (status, listed) = send(&state, "GET", "/api/keys", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["total"], 0);

        let (status, body) = send(&state, "POST", "/api/keys", None, Some(json!({ "name": "k" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"]["message"],
            "User not authenticated. Please sign in to create an API key."
        );
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let state = state();

        let (status, body) = send(&state, "GET", "/api/keys", Some("forged"), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let state = state();
        let created = create(&state, ALICE, json!({ "name": "before" })).await;
        let id = created["id"].as_str().unwrap();
        let uri = format!("/api/keys/{}", id);

        let (status, updated) = send(
            &state,
            "PATCH",
            &uri,
            Some(ALICE),
            Some(json!({ "name": "after", "usage_limit": 5000 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "after");
        assert_eq!(updated["usage_limit"], 5000);
        assert!(updated["key"].as_str().unwrap().contains('•'));

        let (status, _) = send(&state, "DELETE", &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&state, "DELETE", &uri, Some(ALICE), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_other_owner_cannot_touch_key() {
        let state = state();
        let created = create(&state, ALICE, json!({ "name": "mine" })).await;
        let uri = format!("/api/keys/{}", created["id"].as_str().unwrap());

        let (status, listed) = send(&state, "GET", "/api/keys", Some(BOB), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["total"], 0);

        let (status, _) = send(&state, "PATCH", &uri, Some(BOB), Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&state, "DELETE", &uri, Some(BOB), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let state = state();

        let (status, _) = send(&state, "POST", "/api/keys", Some(ALICE), Some(json!({ "name": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            "POST",
            "/api/keys",
            Some(ALICE),
            Some(json!({ "name": "k", "usage_limit": 0 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "PATCH", "/api/keys/not-a-uuid", Some(ALICE), Some(json!({ "name": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_usage_endpoint() {
        let state = state();
        create(&state, ALICE, json!({ "name": "a", "usage_limit": 2000 })).await;
        create(&state, ALICE, json!({ "name": "b", "usage_limit": 3000 })).await;

        let (status, usage) = send(&state, "GET", "/api/usage", Some(ALICE), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(usage["total_limit"], 5000);
        assert_eq!(usage["total_used"], 0);
        assert_eq!(usage["key_count"], 2);
        assert_eq!(usage["percent_used"], 0.0);
    }

    #[tokio::test]
    async fn test_dummy_owner_in_testing_mode() {
        let state = state_with(TestingConfig {
            enabled: true,
            use_dummy_user_id: true,
            ..Default::default()
        });

        let (status, _) = send(&state, "POST", "/api/keys", None, Some(json!({ "name": "k" }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let state = state();

        let (status, health) = send(&state, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");

        let (status, ready) = send(&state, "GET", "/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ready["checks"][0]["name"], "key_store");

        let (status, _) = send(&state, "GET", "/live", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_reports_unreachable_store() {
        let mut store = MockApiKeyStore::new();
        store
            .expect_ping()
            .returning(|| Err(StoreError::backend("connection refused")));
        let store: Arc<dyn ApiKeyStore> = Arc::new(store);
        let service = ApiKeyService::new(store, LifecycleConfig::default());
        let state = AppState::new(Arc::new(service), Arc::new(MockSessionVerifier::new()));

        let (status, ready) = send(&state, "GET", "/ready", None, None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ready["status"], "unhealthy");
        assert_eq!(ready["checks"][0]["status"], "unhealthy");
    }
}
