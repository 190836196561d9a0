//! Keydesk
//!
//! API key management for authenticated users:
//! - Owner-scoped key lifecycle (create, list, edit, delete)
//! - Masked display of secrets with explicit reveal
//! - Usage totals against per-key limits
//! - Pluggable key stores (in-memory, PostgreSQL, PostgREST)

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use api::state::AppState;
use domain::SessionVerifier;
use infrastructure::{
    api_key::{ApiKeyGenerator, ApiKeyService, LifecycleConfig, StoreFactory},
    auth::SupabaseJwtVerifier,
};

/// Build the session verifier from the auth settings
pub fn create_session_verifier(config: &AppConfig) -> anyhow::Result<Arc<dyn SessionVerifier>> {
    let secret = config.auth.jwt_secret.trim();

    if secret.is_empty() {
        if !config.testing.enabled {
            anyhow::bail!("auth.jwt_secret must be set (APP__AUTH__JWT_SECRET)");
        }
        warn!("No JWT secret configured; every session token will be rejected");
        // random key: no token can verify
        let unguessable = uuid::Uuid::new_v4().to_string();
        return Ok(Arc::new(SupabaseJwtVerifier::new(
            &unguessable,
            &config.auth.audience,
        )));
    }

    Ok(Arc::new(SupabaseJwtVerifier::new(secret, &config.auth.audience)))
}

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = StoreFactory::create(&config.storage)
        .await
        .context("Failed to initialize API key store")?;

    let generator = ApiKeyGenerator::new().with_brand(config.keys.brand_prefix.clone());
    let service = ApiKeyService::new(store, LifecycleConfig::new(config.testing.clone()))
        .with_generator(generator);

    let sessions = create_session_verifier(config)?;

    info!(backend = %config.storage.backend, "Application state initialized");
    Ok(AppState::new(Arc::new(service), sessions))
}
