//! Request extractors for authenticated routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use sb_core::entities::Profile;
use sb_core::identity::AuthIdentity;

use crate::error::ApiError;
use crate::state::AppState;

/// A verified bearer session. Does not require a stored profile.
#[derive(Debug, Clone)]
pub struct Session(pub AuthIdentity);

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(sb_auth::bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        let claims = state.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(error = %e, "session rejected");
            ApiError::Unauthorized
        })?;
        if claims.is_expired() {
            return Err(ApiError::Unauthorized);
        }
        Ok(Self(claims.to_identity()))
    }
}

/// A verified session together with the caller's stored profile.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: AuthIdentity,
    pub profile: Profile,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Session(identity) = Session::from_request_parts(parts, state).await?;
        let profile = state
            .svc
            .find_profile_by_clerk_id(&identity.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Profile not found"))?;
        Ok(Self { identity, profile })
    }
}
