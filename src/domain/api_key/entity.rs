//! API Key entity and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::ApiKeyValidationError;

/// Usage ceiling assigned to keys created without an explicit limit
pub const DEFAULT_USAGE_LIMIT: u32 = 1000;

/// API Key identifier (UUID v4, assigned once at creation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyId(Uuid);

impl ApiKeyId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for ApiKeyId {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ApiKeyValidationError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for ApiKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user who owns a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(Uuid);

impl OwnerId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for OwnerId {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ApiKeyValidationError::InvalidId(s.to_string()))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deployment environment a key was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Testing,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Production => "Production",
            Self::Testing => "Testing",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl FromStr for Environment {
    type Err = ApiKeyValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "testing" => Ok(Self::Testing),
            _ => Err(ApiKeyValidationError::UnknownEnvironment(s.to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API Key entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKey {
    /// Unique identifier for the key
    id: ApiKeyId,
    /// Display name for the key
    name: String,
    /// Bearer token handed to the client
    secret: String,
    /// User that owns this key
    owner: OwnerId,
    environment: Environment,
    /// Recorded usage, maintained outside this service
    usage_count: u64,
    usage_limit: u32,
    pii_enabled: bool,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Create a new API key with default limits and a zero usage counter
    pub fn new(
        id: ApiKeyId,
        name: impl Into<String>,
        secret: impl Into<String>,
        owner: OwnerId,
        environment: Environment,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            secret: secret.into(),
            owner,
            environment,
            usage_count: 0,
            usage_limit: DEFAULT_USAGE_LIMIT,
            pii_enabled: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_usage_limit(mut self, usage_limit: u32) -> Self {
        self.usage_limit = usage_limit;
        self
    }

    pub fn with_pii_enabled(mut self, pii_enabled: bool) -> Self {
        self.pii_enabled = pii_enabled;
        self
    }

    /// Set the usage counter (used when loading persisted records)
    pub fn with_usage_count(mut self, usage_count: u64) -> Self {
        self.usage_count = usage_count;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    // Getters

    pub fn id(&self) -> &ApiKeyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn usage_limit(&self) -> u32 {
        self.usage_limit
    }

    pub fn pii_enabled(&self) -> bool {
        self.pii_enabled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply a partial update. Identity, secret, owner and timestamps are untouched.
    pub fn apply(&mut self, update: &ApiKeyUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(environment) = update.environment {
            self.environment = environment;
        }
        if let Some(usage_limit) = update.usage_limit {
            self.usage_limit = usage_limit;
        }
        if let Some(pii_enabled) = update.pii_enabled {
            self.pii_enabled = pii_enabled;
        }
    }
}

/// Partial update of the mutable fields of a key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pii_enabled: Option<bool>,
}

impl ApiKeyUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn usage_limit(mut self, usage_limit: u32) -> Self {
        self.usage_limit = Some(usage_limit);
        self
    }

    pub fn pii_enabled(mut self, pii_enabled: bool) -> Self {
        self.pii_enabled = Some(pii_enabled);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.environment.is_none()
            && self.usage_limit.is_none()
            && self.pii_enabled.is_none()
    }
}

/// Request to issue a new key
#[derive(Debug, Clone, PartialEq)]
pub struct NewApiKey {
    pub name: String,
    pub environment: Environment,
    pub usage_limit: u32,
    pub pii_enabled: bool,
}

impl NewApiKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: Environment::default(),
            usage_limit: DEFAULT_USAGE_LIMIT,
            pii_enabled: false,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_usage_limit(mut self, usage_limit: u32) -> Self {
        self.usage_limit = usage_limit;
        self
    }

    pub fn with_pii_enabled(mut self, pii_enabled: bool) -> Self {
        self.pii_enabled = pii_enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::new(Uuid::new_v4())
    }

    #[test]
    fn test_new_key_defaults() {
        let key = ApiKey::new(
            ApiKeyId::generate(),
            "test-key",
            "dev-abc",
            owner(),
            Environment::Development,
        );

        assert_eq!(key.name(), "test-key");
        assert_eq!(key.usage_count(), 0);
        assert_eq!(key.usage_limit(), DEFAULT_USAGE_LIMIT);
        assert!(!key.pii_enabled());
        assert_eq!(key.environment(), Environment::Development);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("Production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!("production".parse::<Environment>(), Ok(Environment::Production));
        assert_eq!(" TESTING ".parse::<Environment>(), Ok(Environment::Testing));
        assert_eq!("development".parse::<Environment>(), Ok(Environment::Development));
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn test_environment_serde_uses_display_names() {
        let json = serde_json::to_string(&Environment::Production).unwrap();
        assert_eq!(json, "\"Production\"");

        let env: Environment = serde_json::from_str("\"Testing\"").unwrap();
        assert_eq!(env, Environment::Testing);
    }

    #[test]
    fn test_id_parsing() {
        let id = ApiKeyId::generate();
        let parsed: ApiKeyId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);

        assert_eq!(
            "not-a-uuid".parse::<ApiKeyId>(),
            Err(ApiKeyValidationError::InvalidId("not-a-uuid".to_string()))
        );
    }

    #[test]
    fn test_apply_update_touches_only_given_fields() {
        let mut key = ApiKey::new(
            ApiKeyId::generate(),
            "original",
            "prod-secret",
            owner(),
            Environment::Production,
        )
        .with_usage_count(42);
        let before = key.clone();

        key.apply(&ApiKeyUpdate::new().usage_limit(5000));

        assert_eq!(key.usage_limit(), 5000);
        assert_eq!(key.name(), before.name());
        assert_eq!(key.secret(), before.secret());
        assert_eq!(key.owner(), before.owner());
        assert_eq!(key.environment(), before.environment());
        assert_eq!(key.usage_count(), 42);
        assert_eq!(key.created_at(), before.created_at());

        key.apply(&ApiKeyUpdate::new().name("renamed").pii_enabled(true));
        assert_eq!(key.name(), "renamed");
        assert!(key.pii_enabled());
        assert_eq!(key.usage_limit(), 5000);
    }

    #[test]
    fn test_update_is_empty() {
        assert!(ApiKeyUpdate::new().is_empty());
        assert!(!ApiKeyUpdate::new().environment(Environment::Testing).is_empty());
    }

    #[test]
    fn test_new_api_key_defaults() {
        let request = NewApiKey::new("test-key");
        assert_eq!(request.environment, Environment::Development);
        assert_eq!(request.usage_limit, 1000);
        assert!(!request.pii_enabled);
    }
}
