//! Cross-cutting error types for skillbench.
//!
//! Storage, auth and HTTP errors live in their own crates. `CoreError` covers
//! the failures that are meaningful at the domain level and are raised from
//! more than one place (lookup misses, illegal status transitions, bad input).

use thiserror::Error;

/// Errors that can be raised by any skillbench crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// The caller is authenticated but may not touch this entity.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Data failed validation (range, format, required fields).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    pub fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}
