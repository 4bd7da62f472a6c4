use std::sync::Arc;

use async_trait::async_trait;
use clerk_rs::ClerkConfiguration;
use clerk_rs::clerk::Clerk;
use clerk_rs::validators::authorizer::validate_jwt;
use clerk_rs::validators::jwks::MemoryCacheJwksProvider;

use crate::claims::SessionClaims;
use crate::error::AuthError;
use crate::verifier::TokenVerifier;

/// Session verifier backed by Clerk's JWKS endpoint.
///
/// One instance per server. The `MemoryCacheJwksProvider` caches public keys
/// for an hour, so most validations do not touch the network.
#[derive(Clone)]
pub struct ClerkJwksVerifier {
    provider: Arc<MemoryCacheJwksProvider>,
}

impl ClerkJwksVerifier {
    #[must_use]
    pub fn new(secret_key: &str) -> Self {
        let config = ClerkConfiguration::new(None, None, Some(secret_key.to_string()), None);
        let clerk = Clerk::new(config);
        Self {
            provider: Arc::new(MemoryCacheJwksProvider::new(clerk)),
        }
    }
}

impl std::fmt::Debug for ClerkJwksVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClerkJwksVerifier").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenVerifier for ClerkJwksVerifier {
    async fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        validate(token, Arc::clone(&self.provider)).await
    }
}

/// Validate a Clerk session JWT via JWKS and extract its claims.
///
/// # Errors
///
/// Returns `AuthError::JwksValidation` if the token is invalid, expired,
/// or the JWKS endpoint is unreachable.
pub async fn validate(
    jwt: &str,
    provider: Arc<MemoryCacheJwksProvider>,
) -> Result<SessionClaims, AuthError> {
    let clerk_jwt = validate_jwt(jwt, provider)
        .await
        .map_err(|e| AuthError::JwksValidation(e.to_string()))?;

    let expires_at = chrono::DateTime::from_timestamp(i64::from(clerk_jwt.exp), 0)
        .ok_or_else(|| AuthError::JwksValidation("invalid exp timestamp".into()))?;
    let org = clerk_jwt.org.as_ref();

    Ok(SessionClaims {
        user_id: clerk_jwt.sub.clone(),
        org_id: org.map(|o| o.id.clone()),
        org_slug: org.map(|o| o.slug.clone()),
        org_role: org.map(|o| o.role.clone()),
        expires_at,
    })
}
