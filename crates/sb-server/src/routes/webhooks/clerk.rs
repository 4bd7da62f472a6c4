//! `POST /api/webhooks/clerk`: user lifecycle events delivered through Svix.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use sb_auth::webhook::{SvixHeaders, verify_svix};
use sb_config::OrgsConfig;
use sb_core::enums::CorpRole;
use sb_db::error::DatabaseError;
use sb_db::helpers::non_blank;

use super::{header, parse_json};
use crate::error::ApiError;
use crate::routes::{OK, OkBody};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct ClerkEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct ExternalAccount {
    identification_id: Option<String>,
    provider: Option<String>,
}

/// Invitation metadata set on users created through a cohort invite.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InviteMetadata {
    organization_id: Option<String>,
    cohort_id: Option<String>,
    added_by: Option<String>,
    cohort_group_id: Option<String>,
    corporation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClerkUser {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    public_metadata: Option<InviteMetadata>,
    #[serde(default)]
    external_accounts: Vec<ExternalAccount>,
}

impl ClerkUser {
    fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .filter_map(|p| non_blank(p))
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn primary_email(&self) -> Option<&str> {
        self.email_addresses.first().map(|e| e.email_address.as_str())
    }

    fn sso_provider(&self) -> Option<&str> {
        let account = self.external_accounts.first()?;
        non_blank(account.identification_id.as_deref()).or_else(|| non_blank(account.provider.as_deref()))
    }
}

/// Organization a new user joins: invitation metadata, then SSO provider, then the default.
fn initial_org<'a>(orgs: &'a OrgsConfig, user: &'a ClerkUser) -> Option<&'a str> {
    let invited = user
        .public_metadata
        .as_ref()
        .and_then(|m| non_blank(m.organization_id.as_deref()));
    invited
        .or_else(|| user.sso_provider().and_then(|p| orgs.org_for_sso(p)))
        .or_else(|| orgs.default_org())
}

/// `Ok(false)` for a missing row, so callers can skip dangling references.
fn found<T>(result: Result<T, DatabaseError>) -> Result<bool, ApiError> {
    match result {
        Ok(_) => Ok(true),
        Err(DatabaseError::NoResult) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

pub async fn clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<OkBody>, ApiError> {
    let secret = &state.config.clerk.webhook_secret;
    if secret.is_empty() {
        return Err(ApiError::Internal("clerk.webhook_secret is not configured".into()));
    }
    let svix = SvixHeaders::from_lookup(|name| header(&headers, name))?;
    verify_svix(secret, &svix, &body, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, svix_id = svix.id, "clerk webhook rejected");
        ApiError::bad_request("Invalid signature")
    })?;

    let event: ClerkEvent = parse_json(&body)?;
    match event.kind.as_str() {
        "user.created" | "user.updated" => {
            let user: ClerkUser = serde_json::from_value(event.data)
                .map_err(|e| ApiError::BadRequest(format!("Invalid user payload: {e}")))?;
            sync_user(&state, &user, event.kind == "user.created").await?;
        }
        other => tracing::debug!(event = other, "ignoring clerk event"),
    }
    Ok(Json(OK))
}

async fn sync_user(state: &AppState, user: &ClerkUser, created: bool) -> Result<(), ApiError> {
    let profile = state
        .svc
        .upsert_profile(&user.id, user.full_name().as_deref(), user.primary_email())
        .await?;
    tracing::info!(clerk_user_id = %user.id, profile_id = %profile.id, created, "profile synced");

    match &state.clerk {
        Some(clerk) => {
            for membership in clerk.list_user_org_memberships(&user.id).await? {
                if let Some(org) = state.svc.find_org_by_slug(&membership.org_slug).await? {
                    state.svc.upsert_org_membership(&profile.id, &org.id, None).await?;
                }
            }
        }
        None => tracing::warn!("clerk client not configured, skipping membership sync"),
    }

    if !created {
        return Ok(());
    }

    if let Some(org_id) = initial_org(&state.config.orgs, user) {
        if found(state.svc.get_organization(org_id).await)? {
            state
                .svc
                .upsert_org_membership(&profile.id, org_id, Some("user"))
                .await?;
        } else {
            tracing::warn!(org_id, "initial organization does not exist");
        }
    }

    let invite = user.public_metadata.clone().unwrap_or_default();
    let Some(cohort_id) = non_blank(invite.cohort_id.as_deref()) else {
        return Ok(());
    };
    if !found(state.svc.get_cohort(cohort_id).await)? {
        tracing::warn!(cohort_id, "invitation references unknown cohort");
        return Ok(());
    }
    state
        .svc
        .add_cohort_member(
            cohort_id,
            &profile.id,
            non_blank(invite.added_by.as_deref()),
            non_blank(invite.cohort_group_id.as_deref()),
        )
        .await?;

    if let Some(corporation_id) = non_blank(invite.corporation_id.as_deref()) {
        if found(state.svc.get_corporation(corporation_id).await)? {
            state
                .svc
                .upsert_corp_membership(&profile.id, corporation_id, CorpRole::Member, None)
                .await?;
        } else {
            tracing::warn!(corporation_id, "invitation references unknown corporation");
        }
    }
    Ok(())
}
