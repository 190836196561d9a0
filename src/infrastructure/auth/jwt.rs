//! Verification of session tokens issued by the hosted auth provider

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

use crate::domain::api_key::OwnerId;
use crate::domain::session::{SessionError, SessionVerifier};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    pub aud: String,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// HS256 verifier for session tokens signed with the project's JWT secret
#[derive(Clone)]
pub struct SupabaseJwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Debug for SupabaseJwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseJwtVerifier")
            .field("decoding_key", &"[hidden]")
            .field("audience", &self.validation.aud)
            .finish()
    }
}

impl SupabaseJwtVerifier {
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Decode and validate a token, returning its claims
    pub fn claims(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Session token rejected");
                SessionError::invalid(e.to_string())
            })
    }
}

impl SessionVerifier for SupabaseJwtVerifier {
    fn verify(&self, token: &str) -> Result<OwnerId, SessionError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::Missing);
        }

        let claims = self.claims(token)?;
        claims
            .sub
            .parse::<OwnerId>()
            .map_err(|_| SessionError::invalid("subject is not a user id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    const SECRET: &str = "test-jwt-secret";

    fn token(sub: &str, aud: &str, secret: &str, expires_in: Duration) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            aud: aud.to_string(),
            exp: (Utc::now() + expires_in).timestamp(),
            role: Some("authenticated".to_string()),
            email: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn verifier() -> SupabaseJwtVerifier {
        SupabaseJwtVerifier::new(SECRET, "authenticated")
    }

    #[test]
    fn test_valid_token_yields_owner() {
        let user = Uuid::new_v4();
        let jwt = token(&user.to_string(), "authenticated", SECRET, Duration::hours(1));

        assert_eq!(verifier().verify(&jwt), Ok(OwnerId::new(user)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let jwt = token(
            &Uuid::new_v4().to_string(),
            "authenticated",
            "other-secret",
            Duration::hours(1),
        );

        assert!(matches!(verifier().verify(&jwt), Err(SessionError::Invalid { .. })));
    }

    #[test]
    fn test_wrong_audience_is_invalid() {
        let jwt = token(&Uuid::new_v4().to_string(), "anon", SECRET, Duration::hours(1));
        assert!(verifier().verify(&jwt).is_err());
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let jwt = token(
            &Uuid::new_v4().to_string(),
            "authenticated",
            SECRET,
            Duration::hours(-2),
        );
        assert!(verifier().verify(&jwt).is_err());
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let jwt = token("service-account", "authenticated", SECRET, Duration::hours(1));
        assert_eq!(
            verifier().verify(&jwt),
            Err(SessionError::invalid("subject is not a user id"))
        );
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert_eq!(verifier().verify("  "), Err(SessionError::Missing));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", verifier());
        assert!(!debug.contains(SECRET));
    }
}
