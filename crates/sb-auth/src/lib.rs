//! # sb-auth
//!
//! Identity plumbing for skillbench.
//!
//! Provides Clerk session JWT validation (`clerk-rs` JWKS), a Clerk Backend API
//! client (`reqwest`) for organization and user provisioning, and signature
//! checks for the Clerk (Svix), partner, and Sanity webhooks.

pub mod claims;
pub mod clerk;
pub mod error;
pub mod jwks;
pub mod verifier;
pub mod webhook;

pub use claims::SessionClaims;
pub use clerk::ClerkClient;
pub use error::AuthError;
pub use jwks::ClerkJwksVerifier;
pub use verifier::{StaticTokenVerifier, TokenVerifier};

/// Extract the token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
