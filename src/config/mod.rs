//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, KeySettings, LogFormat, LoggingConfig, PostgresSettings,
    PostgrestSettings, ServerConfig, StorageSettings,
};
