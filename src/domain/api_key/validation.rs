//! API key validation utilities

use thiserror::Error;

/// Errors that can occur during API key validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("API key name cannot be empty")]
    EmptyName,

    #[error("API key name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Usage limit must be greater than zero")]
    ZeroUsageLimit,

    #[error("Unknown environment '{0}'. Expected Development, Production or Testing")]
    UnknownEnvironment(String),

    #[error("Invalid identifier '{0}': expected a UUID")]
    InvalidId(String),

    #[error("Update must change at least one field")]
    EmptyUpdate,
}

pub const MAX_API_KEY_NAME_LENGTH: usize = 100;

/// Validate an API key name and return its trimmed form
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Maximum 100 characters after trimming
pub fn validate_key_name(name: &str) -> Result<&str, ApiKeyValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ApiKeyValidationError::EmptyName);
    }

    if trimmed.chars().count() > MAX_API_KEY_NAME_LENGTH {
        return Err(ApiKeyValidationError::NameTooLong(MAX_API_KEY_NAME_LENGTH));
    }

    Ok(trimmed)
}

/// Validate a usage limit (must be a positive ceiling)
pub fn validate_usage_limit(limit: u32) -> Result<u32, ApiKeyValidationError> {
    if limit == 0 {
        return Err(ApiKeyValidationError::ZeroUsageLimit);
    }

    Ok(limit)
}
