//! In-memory API key store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyStore, ApiKeyUpdate, OwnerScope};
use crate::domain::StoreError;

#[derive(Debug, Default)]
struct Records {
    keys: HashMap<ApiKeyId, ApiKey>,
    secret_index: HashMap<String, ApiKeyId>,
}

/// In-memory implementation of ApiKeyStore
#[derive(Debug, Default)]
pub struct InMemoryApiKeyStore {
    records: RwLock<Records>,
}

impl InMemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing records
    pub fn with_keys(keys: Vec<ApiKey>) -> Self {
        let mut records = Records::default();
        for key in keys {
            records
                .secret_index
                .insert(key.secret().to_string(), *key.id());
            records.keys.insert(*key.id(), key);
        }

        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<ApiKey>, StoreError> {
        if *scope == OwnerScope::Nobody {
            return Ok(Vec::new());
        }

        let records = self.records.read().await;
        let mut keys: Vec<ApiKey> = records
            .keys
            .values()
            .filter(|k| scope.permits(k.owner()))
            .cloned()
            .collect();

        keys.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(keys)
    }

    async fn insert(&self, api_key: ApiKey) -> Result<ApiKey, StoreError> {
        let mut records = self.records.write().await;

        if records.keys.contains_key(api_key.id()) {
            return Err(StoreError::conflict(format!(
                "API key with ID '{}' already exists",
                api_key.id()
            )));
        }

        if records.secret_index.contains_key(api_key.secret()) {
            return Err(StoreError::conflict("API key secret already exists"));
        }

        records
            .secret_index
            .insert(api_key.secret().to_string(), *api_key.id());
        records.keys.insert(*api_key.id(), api_key.clone());

        Ok(api_key)
    }

    async fn update_fields(
        &self,
        id: &ApiKeyId,
        scope: &OwnerScope,
        update: &ApiKeyUpdate,
    ) -> Result<ApiKey, StoreError> {
        let mut records = self.records.write().await;

        match records.keys.get_mut(id) {
            Some(key) if scope.permits(key.owner()) => {
                key.apply(update);
                Ok(key.clone())
            }
            _ => Err(StoreError::not_found(format!("API key '{}' not found", id))),
        }
    }

    async fn remove(&self, id: &ApiKeyId, scope: &OwnerScope) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;

        let visible = records
            .keys
            .get(id)
            .is_some_and(|key| scope.permits(key.owner()));
        if !visible {
            return Ok(false);
        }

        if let Some(key) = records.keys.remove(id) {
            records.secret_index.remove(key.secret());
        }
        Ok(true)
    }
}
