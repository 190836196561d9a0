//! Store factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::config::{PostgresSettings, PostgrestSettings, StorageSettings};
use crate::domain::api_key::ApiKeyStore;
use crate::domain::StoreError;

use super::in_memory::InMemoryApiKeyStore;
use super::postgres::{PostgresApiKeyStore, PostgresConfig};
use super::postgrest::{PostgrestApiKeyStore, PostgrestConfig};

/// Supported store backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store (for testing/development)
    InMemory,
    /// Direct PostgreSQL connection
    Postgres,
    /// REST interface of the hosted data service
    Postgrest,
}

impl StoreBackend {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "postgrest" | "rest" | "supabase" => Some(Self::Postgrest),
            _ => None,
        }
    }
}

impl From<&PostgresSettings> for PostgresConfig {
    fn from(settings: &PostgresSettings) -> Self {
        PostgresConfig::new(&settings.url)
            .with_max_connections(settings.max_connections)
            .with_min_connections(settings.min_connections)
            .with_connect_timeout(settings.connect_timeout_secs)
            .with_idle_timeout(settings.idle_timeout_secs)
    }
}

impl PostgrestConfig {
    pub fn from_settings(settings: &PostgrestSettings, table: &str) -> Self {
        PostgrestConfig::new(&settings.url, &settings.service_key)
            .with_table(table)
            .with_timeout(settings.timeout_secs)
    }
}

/// Factory for creating key stores
#[derive(Debug)]
pub struct StoreFactory;

impl StoreFactory {
    /// Creates the store selected by `settings.backend`
    pub async fn create(settings: &StorageSettings) -> Result<Arc<dyn ApiKeyStore>, StoreError> {
        let backend = StoreBackend::from_str(&settings.backend).ok_or_else(|| {
            StoreError::backend(format!("Unknown storage backend '{}'", settings.backend))
        })?;

        info!(backend = ?backend, table = %settings.table, "Initializing API key store");

        match backend {
            StoreBackend::InMemory => Ok(Arc::new(InMemoryApiKeyStore::new())),
            StoreBackend::Postgres => Ok(Arc::new(Self::create_postgres(settings).await?)),
            StoreBackend::Postgrest => {
                let config = PostgrestConfig::from_settings(&settings.postgrest, &settings.table);
                Ok(Arc::new(PostgrestApiKeyStore::new(&config)?))
            }
        }
    }

    /// Creates a PostgreSQL store without touching the schema
    pub async fn create_postgres(
        settings: &StorageSettings,
    ) -> Result<PostgresApiKeyStore, StoreError> {
        let config = PostgresConfig::from(&settings.postgres);
        PostgresApiKeyStore::connect(&config, &settings.table).await
    }
}
