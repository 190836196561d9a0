//! Application state for shared services

use std::sync::Arc;

use crate::domain::{ApiKeyStore, SessionVerifier};
use crate::infrastructure::api_key::ApiKeyService;

/// Key lifecycle service over whichever store backend is configured
pub type DynApiKeyService = ApiKeyService<dyn ApiKeyStore>;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub api_keys: Arc<DynApiKeyService>,
    pub sessions: Arc<dyn SessionVerifier>,
}

impl AppState {
    pub fn new(api_keys: Arc<DynApiKeyService>, sessions: Arc<dyn SessionVerifier>) -> Self {
        Self { api_keys, sessions }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_keys", &self.api_keys)
            .finish_non_exhaustive()
    }
}
