//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod error;
pub mod session;

pub use api_key::{
    ApiKey, ApiKeyId, ApiKeyStore, ApiKeyUpdate, ApiKeyValidationError, Environment, NewApiKey,
    OwnerId, OwnerScope, UsageSummary,
};
pub use error::{LifecycleError, StoreError};
pub use session::{SessionError, SessionVerifier};
