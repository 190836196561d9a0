use std::fmt;

use serde::Deserialize;

use crate::infrastructure::api_key::TestingConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageSettings,
    pub auth: AuthConfig,
    pub testing: TestingConfig,
    pub keys: KeySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where key records live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// `memory`, `postgres` or `postgrest`
    pub backend: String,
    pub table: String,
    pub postgres: PostgresSettings,
    pub postgrest: PostgrestSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct PostgrestSettings {
    pub url: String,
    pub service_key: String,
    pub timeout_secs: u64,
}

/// Session token verification settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret the auth provider signs session tokens with
    pub jwt_secret: String,
    pub audience: String,
}

/// Key issuance settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    /// Brand prefix prepended to every secret, e.g. "tvly-"
    pub brand_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            table: "api_keys".to_string(),
            postgres: PostgresSettings::default(),
            postgrest: PostgrestSettings::default(),
        }
    }
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/keydesk".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl Default for PostgrestSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:54321".to_string(),
            service_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for PostgrestSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgrestSettings")
            .field("url", &self.url)
            .field("service_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            audience: "authenticated".to_string(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .finish()
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enforce_owner_scoping() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.storage.table, "api_keys");
        assert_eq!(config.auth.audience, "authenticated");
        assert!(!config.testing.enabled);
        assert!(!config.testing.bypass_auth);
        assert!(config.testing.dummy_user_id.is_nil());
        assert!(config.keys.brand_prefix.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                [storage]
                backend = "postgrest"

                [storage.postgrest]
                url = "https://project.supabase.co"
                service_key = "service-key"

                [testing]
                enabled = true
                use_dummy_user_id = true
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage.backend, "postgrest");
        assert_eq!(config.storage.postgrest.url, "https://project.supabase.co");
        assert_eq!(config.storage.postgrest.timeout_secs, 30);
        assert!(config.testing.enabled);
        assert!(config.testing.use_dummy_user_id);
        assert!(!config.testing.bypass_auth);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "super-secret-jwt".to_string();
        config.storage.postgrest.service_key = "super-secret-service".to_string();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-jwt"));
        assert!(!debug.contains("super-secret-service"));
    }
}
