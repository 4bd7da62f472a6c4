use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("token expired")]
    TokenExpired,

    #[error("JWKS validation failed: {0}")]
    JwksValidation(String),

    #[error("clerk API error: {0}")]
    ClerkApiError(String),

    #[error("missing webhook header: {0}")]
    MissingHeader(&'static str),

    #[error("invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0}")]
    Other(String),
}
