//! Caller identity resolution

use thiserror::Error;

use super::api_key::OwnerId;

#[cfg(test)]
use mockall::automock;

/// Reasons a session token could not be turned into an owner
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("No session token provided")]
    Missing,

    #[error("Invalid session token: {message}")]
    Invalid { message: String },
}

impl SessionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Verifies session tokens issued by the external auth provider
#[cfg_attr(test, automock)]
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<OwnerId, SessionError>;
}
