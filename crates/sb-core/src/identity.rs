use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lightweight authenticated user identity for cross-crate passing.
///
/// Produced by `sb-auth` from a validated session token, consumed by the HTTP
/// handlers. Contains only data fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AuthIdentity {
    /// Clerk user ID (from JWT `sub` claim).
    pub user_id: String,
    /// Active organization ID (from JWT `org_id` claim), if any.
    pub org_id: Option<String>,
    /// Active organization slug (from JWT `org_slug` claim).
    pub org_slug: Option<String>,
    /// Organization role (from JWT `org_role` claim, e.g. `"org:corp_admin"`).
    pub org_role: Option<String>,
}

impl AuthIdentity {
    /// Identity with only a user ID (no active organization).
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: None,
            org_slug: None,
            org_role: None,
        }
    }
}
