use chrono::{DateTime, Utc};
use sb_core::identity::AuthIdentity;

/// Validated claims of a Clerk session token.
///
/// Produced by a [`TokenVerifier`](crate::TokenVerifier), turned into an
/// [`AuthIdentity`] for the request handlers.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    /// Clerk user ID (`sub` claim).
    pub user_id: String,
    /// Active organization ID. `None` for a personal session.
    pub org_id: Option<String>,
    pub org_slug: Option<String>,
    /// Organization role, e.g. `"org:corp_admin"`.
    pub org_role: Option<String>,
    /// Token expiration time (`exp` claim).
    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    #[must_use]
    pub fn to_identity(&self) -> AuthIdentity {
        AuthIdentity {
            user_id: self.user_id.clone(),
            org_id: self.org_id.clone(),
            org_slug: self.org_slug.clone(),
            org_role: self.org_role.clone(),
        }
    }

    /// Check if the token is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        let threshold = Utc::now() + chrono::TimeDelta::seconds(buffer_secs);
        self.expires_at <= threshold
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_near_expiry(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_claims(expires_at: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            user_id: "user_test123".into(),
            org_id: Some("org_abc".into()),
            org_slug: Some("worldcc".into()),
            org_role: Some("org:corp_admin".into()),
            expires_at,
        }
    }

    #[test]
    fn to_identity_maps_all_fields() {
        let identity = make_claims(Utc::now() + chrono::TimeDelta::hours(1)).to_identity();
        assert_eq!(identity.user_id, "user_test123");
        assert_eq!(identity.org_id.as_deref(), Some("org_abc"));
        assert_eq!(identity.org_slug.as_deref(), Some("worldcc"));
        assert_eq!(identity.org_role.as_deref(), Some("org:corp_admin"));
    }

    #[test]
    fn expired_in_the_past() {
        let claims = make_claims(Utc::now() - chrono::TimeDelta::seconds(10));
        assert!(claims.is_expired());
        assert!(claims.is_near_expiry(60));
    }

    #[test]
    fn near_expiry_respects_buffer() {
        let claims = make_claims(Utc::now() + chrono::TimeDelta::seconds(30));
        assert!(!claims.is_expired());
        assert!(claims.is_near_expiry(60));

        let claims = make_claims(Utc::now() + chrono::TimeDelta::seconds(120));
        assert!(!claims.is_near_expiry(60));
    }
}
