//! Session token verification seam.
//!
//! The HTTP layer only sees [`TokenVerifier`]. Production wires in
//! [`ClerkJwksVerifier`](crate::jwks::ClerkJwksVerifier); local development
//! and tests use [`StaticTokenVerifier`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;

use crate::claims::SessionClaims;
use crate::error::AuthError;

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validate a bearer token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` when the token is unknown, malformed, or expired.
    async fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

/// Fixed token → user table. Tokens never expire.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as a session for `user_id`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let user_id = self.tokens.get(token).ok_or(AuthError::NotAuthenticated)?;
        Ok(SessionClaims {
            user_id: user_id.clone(),
            org_id: None,
            org_slug: None,
            org_role: None,
            expires_at: Utc::now() + chrono::TimeDelta::days(365),
        })
    }
}
