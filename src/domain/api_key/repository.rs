//! API Key store trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId, ApiKeyUpdate, OwnerId};
use crate::domain::error::StoreError;

#[cfg(test)]
use mockall::automock;

/// Authorization scope applied to every store query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// Only records owned by this user
    Owner(OwnerId),
    /// Scoping is enforced but there is no caller: nothing matches
    Nobody,
    /// Scoping is disabled
    Everyone,
}

impl OwnerScope {
    /// Whether a record owned by `owner` is visible within this scope
    pub fn permits(&self, owner: &OwnerId) -> bool {
        match self {
            Self::Owner(scoped) => scoped == owner,
            Self::Nobody => false,
            Self::Everyone => true,
        }
    }
}

/// Persistence for API key records.
///
/// Each call maps to a single request against the backing service.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiKeyStore: Send + Sync + Debug {
    /// Records visible in `scope`, newest first
    async fn list(&self, scope: &OwnerScope) -> Result<Vec<ApiKey>, StoreError>;

    /// Persist a fully populated record
    async fn insert(&self, api_key: ApiKey) -> Result<ApiKey, StoreError>;

    /// Apply the mutable fields of `update` to the record `id` within `scope`
    async fn update_fields(
        &self,
        id: &ApiKeyId,
        scope: &OwnerScope,
        update: &ApiKeyUpdate,
    ) -> Result<ApiKey, StoreError>;

    /// Delete the record `id` within `scope`. Returns false when nothing matched.
    async fn remove(&self, id: &ApiKeyId, scope: &OwnerScope) -> Result<bool, StoreError>;

    /// Connectivity probe
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
