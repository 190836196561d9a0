//! API Key lifecycle service
//!
//! Issues, lists, edits and deletes keys on behalf of a caller. Every
//! operation receives the caller explicitly and resolves it to an owner
//! scope before touching the store.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::api_key::{
    ApiKey, ApiKeyId, ApiKeyStore, ApiKeyUpdate, ApiKeyValidationError, NewApiKey, OwnerId,
    OwnerScope, UsageSummary, validate_key_name, validate_usage_limit,
};
use crate::domain::LifecycleError;

use super::generator::ApiKeyGenerator;

/// Toggles that relax owner enforcement for local testing.
///
/// Everything defaults to off, which enforces owner scoping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TestingConfig {
    /// Master switch; the other toggles only apply while this is on
    pub enabled: bool,
    /// List, update and delete across all owners
    pub bypass_auth: bool,
    /// Create keys for `dummy_user_id` when there is no caller
    pub use_dummy_user_id: bool,
    pub dummy_user_id: Uuid,
    pub verbose_logging: bool,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bypass_auth: false,
            use_dummy_user_id: false,
            dummy_user_id: Uuid::nil(),
            verbose_logging: false,
        }
    }
}

impl TestingConfig {
    pub fn bypasses_auth(&self) -> bool {
        self.enabled && self.bypass_auth
    }

    /// Owner to use for anonymous creation, if configured
    pub fn dummy_owner(&self) -> Option<OwnerId> {
        (self.enabled && self.use_dummy_user_id).then(|| OwnerId::new(self.dummy_user_id))
    }

    fn verbose(&self) -> bool {
        self.enabled && self.verbose_logging
    }
}

/// Settings handed to the lifecycle service at construction
#[derive(Debug, Clone, Default)]
pub struct LifecycleConfig {
    pub testing: TestingConfig,
}

impl LifecycleConfig {
    pub fn new(testing: TestingConfig) -> Self {
        Self { testing }
    }
}

/// API Key service for managing a caller's keys
#[derive(Debug)]
pub struct ApiKeyService<S>
where
    S: ApiKeyStore + ?Sized,
{
    store: Arc<S>,
    config: LifecycleConfig,
    generator: ApiKeyGenerator,
}

impl<S: ApiKeyStore + ?Sized> ApiKeyService<S> {
    pub fn new(store: Arc<S>, config: LifecycleConfig) -> Self {
        Self {
            store,
            config,
            generator: ApiKeyGenerator::new(),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    fn scope_for(&self, caller: Option<&OwnerId>) -> OwnerScope {
        let testing = &self.config.testing;
        if testing.bypasses_auth() {
            if testing.verbose() {
                info!("Testing mode: owner scoping bypassed");
            }
            return OwnerScope::Everyone;
        }

        match caller {
            Some(owner) => OwnerScope::Owner(*owner),
            None => {
                if testing.verbose() {
                    info!("Testing mode: no caller, scope matches nothing");
                }
                OwnerScope::Nobody
            }
        }
    }

    fn owner_for_create(&self, caller: Option<&OwnerId>) -> Result<OwnerId, LifecycleError> {
        if let Some(owner) = caller {
            return Ok(*owner);
        }

        match self.config.testing.dummy_owner() {
            Some(owner) => {
                if self.config.testing.verbose() {
                    info!(owner = %owner, "Testing mode: using dummy owner");
                }
                Ok(owner)
            }
            None => Err(LifecycleError::unauthenticated(
                "User not authenticated. Please sign in to create an API key.",
            )),
        }
    }

    /// Keys visible to the caller, newest first
    pub async fn fetch_keys(&self, caller: Option<&OwnerId>) -> Result<Vec<ApiKey>, LifecycleError> {
        let scope = self.scope_for(caller);
        let keys = self
            .store
            .list(&scope)
            .await
            .map_err(|e| LifecycleError::store("Failed to fetch API keys", e))?;

        debug!(count = keys.len(), "Fetched API keys");
        Ok(keys)
    }

    /// Issue a new key for the caller
    pub async fn create_key(
        &self,
        caller: Option<&OwnerId>,
        request: NewApiKey,
    ) -> Result<ApiKey, LifecycleError> {
        let name = validate_key_name(&request.name)?.to_string();
        let usage_limit = validate_usage_limit(request.usage_limit)?;
        let owner = self.owner_for_create(caller)?;

        let id = self.generator.generate_id();
        let secret = self.generator.generate_secret(request.environment);

        let api_key = ApiKey::new(id, name, secret, owner, request.environment)
            .with_usage_limit(usage_limit)
            .with_pii_enabled(request.pii_enabled);

        let created = self
            .store
            .insert(api_key)
            .await
            .map_err(|e| LifecycleError::store("Failed to create API key", e))?;

        info!(
            id = %created.id(),
            owner = %created.owner(),
            environment = %created.environment(),
            "API key created"
        );

        Ok(created)
    }

    /// Change the mutable fields of one of the caller's keys
    pub async fn update_key(
        &self,
        caller: Option<&OwnerId>,
        id: &ApiKeyId,
        mut update: ApiKeyUpdate,
    ) -> Result<ApiKey, LifecycleError> {
        if update.is_empty() {
            return Err(ApiKeyValidationError::EmptyUpdate.into());
        }
        if let Some(name) = update.name.take() {
            update.name = Some(validate_key_name(&name)?.to_string());
        }
        if let Some(limit) = update.usage_limit {
            validate_usage_limit(limit)?;
        }

        let scope = self.scope_for(caller);
        let updated = self
            .store
            .update_fields(id, &scope, &update)
            .await
            .map_err(|e| LifecycleError::store("Failed to update API key", e))?;

        info!(id = %id, owner = %updated.owner(), "API key updated");
        Ok(updated)
    }

    /// Delete one of the caller's keys
    pub async fn delete_key(
        &self,
        caller: Option<&OwnerId>,
        id: &ApiKeyId,
    ) -> Result<(), LifecycleError> {
        let scope = self.scope_for(caller);
        let deleted = self
            .store
            .remove(id, &scope)
            .await
            .map_err(|e| LifecycleError::store("Failed to delete API key", e))?;

        if !deleted {
            return Err(LifecycleError::not_found(format!(
                "API key '{}' not found",
                id
            )));
        }

        match caller {
            Some(owner) => info!(id = %id, owner = %owner, "API key deleted"),
            None => info!(id = %id, "API key deleted"),
        }
        Ok(())
    }

    /// Usage totals across the caller's keys
    pub async fn usage_summary(
        &self,
        caller: Option<&OwnerId>,
    ) -> Result<UsageSummary, LifecycleError> {
        let keys = self.fetch_keys(caller).await?;
        Ok(UsageSummary::from_keys(&keys))
    }
}
