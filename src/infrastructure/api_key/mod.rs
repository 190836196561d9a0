//! API Key infrastructure implementations
//!
//! Key generation, the lifecycle service and the store backends
//! (in-memory, PostgreSQL, PostgREST).

mod factory;
mod generator;
mod in_memory;
mod postgres;
mod postgrest;
mod row;
mod service;

pub use factory::{StoreBackend, StoreFactory};
pub use generator::ApiKeyGenerator;
pub use in_memory::InMemoryApiKeyStore;
pub use postgres::{PostgresApiKeyStore, PostgresConfig};
pub use postgrest::{PostgrestApiKeyStore, PostgrestConfig};
pub use row::{ApiKeyPatch, ApiKeyRow};
pub use service::{ApiKeyService, LifecycleConfig, TestingConfig};
