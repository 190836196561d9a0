//! API Key domain
//!
//! Domain types and traits for the API key lifecycle: the key record,
//! owner scoping, validation, display masking and usage totals.

mod entity;
mod masking;
mod repository;
mod usage;
mod validation;

pub use entity::{
    ApiKey, ApiKeyId, ApiKeyUpdate, DEFAULT_USAGE_LIMIT, Environment, NewApiKey, OwnerId,
};
pub use masking::{display_secret, mask_secret};
#[cfg(test)]
pub use repository::MockApiKeyStore;
pub use repository::{ApiKeyStore, OwnerScope};
pub use usage::UsageSummary;
pub use validation::{
    ApiKeyValidationError, MAX_API_KEY_NAME_LENGTH, validate_key_name, validate_usage_limit,
};
