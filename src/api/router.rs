use axum::{Router, http::HeaderName, middleware, routing::get};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::dashboard;
use super::health;
use super::middleware::{REQUEST_ID_HEADER, logging_middleware};
use super::state::AppState;

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/api", dashboard::create_dashboard_router())
        .route_layer(middleware::from_fn(logging_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use tracing_subscriber::fmt::MakeWriter;
    use uuid::Uuid;

    use super::*;
    use crate::domain::api_key::ApiKeyStore;
    use crate::domain::session::MockSessionVerifier;
    use crate::infrastructure::api_key::{ApiKeyService, InMemoryApiKeyStore, LifecycleConfig};

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn state() -> AppState {
        let store: Arc<dyn ApiKeyStore> = Arc::new(InMemoryApiKeyStore::new());
        let service = ApiKeyService::new(store, LifecycleConfig::default());
        AppState::new(Arc::new(service), Arc::new(MockSessionVerifier::new()))
    }

    #[tokio::test]
    async fn test_request_log_uses_route_template() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let id = Uuid::new_v4();
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/api/keys/{}", id))
            .body(Body::empty())
            .unwrap();

        let response = create_router_with_state(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let output = logs.contents();
        let request_lines: Vec<&str> = output
            .lines()
            .filter(|line| line.contains("Incoming request") || line.contains("Request completed"))
            .collect();

        assert_eq!(request_lines.len(), 2, "{}", output);
        for line in request_lines {
            assert!(line.contains("path=/api/keys/{key_id}"), "{}", line);
            assert!(!line.contains(&id.to_string()), "{}", line);
        }
    }
}
