//! API Key generation
//!
//! Secrets are an environment tag followed by a random UUID v4, optionally
//! preceded by a brand prefix shared by every key the deployment issues.

use uuid::Uuid;

use crate::domain::api_key::{ApiKeyId, Environment};

const PRODUCTION_TAG: &str = "prod-";
const DEVELOPMENT_TAG: &str = "dev-";

/// Generator for key identifiers and secrets
#[derive(Debug, Clone, Default)]
pub struct ApiKeyGenerator {
    /// Prefix for all generated secrets (e.g. "tvly-"), empty by default
    brand: String,
}

impl ApiKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `brand` to every generated secret
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    /// Environment tag for a free-form environment label
    pub fn prefix_for(environment: &str) -> &'static str {
        if environment.trim().eq_ignore_ascii_case("production") {
            PRODUCTION_TAG
        } else {
            DEVELOPMENT_TAG
        }
    }

    /// Generate a new secret for a key issued in `environment`
    pub fn generate_secret(&self, environment: Environment) -> String {
        format!(
            "{}{}{}",
            self.brand,
            Self::prefix_for(environment.as_str()),
            Uuid::new_v4()
        )
    }

    pub fn generate_id(&self) -> ApiKeyId {
        ApiKeyId::generate()
    }
}
