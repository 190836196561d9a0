//! Authentication infrastructure module
//!
//! Verifies session tokens issued by the external auth provider.

mod jwt;

pub use jwt::{SessionClaims, SupabaseJwtVerifier};
