pub mod account;
pub mod assessment;
pub mod health;
pub mod results;
pub mod templates;
pub mod webhooks;

use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// `{"ok": true}`
#[derive(Debug, Serialize)]
pub struct OkBody {
    pub ok: bool,
}

pub const OK: OkBody = OkBody { ok: true };

/// The template the user should be working on: their cohort's, else the default.
pub(crate) async fn resolve_template(state: &AppState, profile_id: &str) -> Result<String, ApiError> {
    state
        .svc
        .resolve_template_for_user(profile_id, state.config.assessment.default_template())
        .await?
        .ok_or_else(|| ApiError::not_found("No assessment template assigned"))
}

/// Value of a query parameter, ignoring blanks.
pub(crate) fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}
