use std::sync::Arc;

use sb_auth::{ClerkClient, ClerkJwksVerifier, TokenVerifier};
use sb_config::SkillbenchConfig;
use sb_db::service::SkillService;

use crate::error::ApiError;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub svc: Arc<SkillService>,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Backend API client, absent when no Clerk secret is configured.
    pub clerk: Option<ClerkClient>,
    pub config: Arc<SkillbenchConfig>,
}

impl AppState {
    /// Production wiring: JWKS session verification and the Clerk Backend API.
    ///
    /// # Errors
    ///
    /// Returns an error if Clerk is not configured.
    pub fn from_config(svc: SkillService, config: SkillbenchConfig) -> Result<Self, sb_auth::AuthError> {
        let clerk = ClerkClient::from_config(&config.clerk)?;
        let verifier = ClerkJwksVerifier::new(&config.clerk.secret_key);
        Ok(Self {
            svc: Arc::new(svc),
            verifier: Arc::new(verifier),
            clerk: Some(clerk),
            config: Arc::new(config),
        })
    }

    pub fn new(
        svc: SkillService,
        verifier: Arc<dyn TokenVerifier>,
        clerk: Option<ClerkClient>,
        config: SkillbenchConfig,
    ) -> Self {
        Self {
            svc: Arc::new(svc),
            verifier,
            clerk,
            config: Arc::new(config),
        }
    }

    pub(crate) fn clerk(&self) -> Result<&ClerkClient, ApiError> {
        self.clerk
            .as_ref()
            .ok_or_else(|| ApiError::Internal("clerk.secret_key is not configured".into()))
    }
}
