//! init-db command - prepares the PostgreSQL schema

use anyhow::Context;
use tracing::info;

use crate::infrastructure::api_key::{StoreBackend, StoreFactory};

pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    if StoreBackend::from_str(&config.storage.backend) != Some(StoreBackend::Postgres) {
        anyhow::bail!(
            "init-db needs storage.backend = \"postgres\" (configured: \"{}\")",
            config.storage.backend
        );
    }

    let store = StoreFactory::create_postgres(&config.storage)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store
        .ensure_table()
        .await
        .context("Failed to create API key table")?;

    info!(table = %store.table_name(), "API key table is ready");
    Ok(())
}
