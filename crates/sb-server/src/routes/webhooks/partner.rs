//! Partner provisioning and payment webhooks, signed with a shared hex HMAC.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use sb_auth::ClerkClient;
use sb_auth::clerk::NewClerkUser;
use sb_auth::webhook::{PARTNER_SIGNATURE, verify_hex_signature};
use sb_core::enums::{CorpRole, SyncType};
use sb_db::helpers::non_blank;

use super::{header, parse_json};
use crate::error::ApiError;
use crate::state::AppState;

const CORP_ADMIN_ORG_ROLE: &str = "org:corp_admin";

fn verify(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), ApiError> {
    verify_hex_signature(
        &state.config.webhooks.provision_secret,
        header(headers, PARTNER_SIGNATURE),
        body,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "partner webhook rejected");
        ApiError::InvalidSignature
    })
}

#[derive(Debug, Deserialize)]
struct AdminUser {
    #[serde(default)]
    email: String,
    #[serde(default)]
    full_name: String,
    external_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProvisionAdmin {
    #[serde(default)]
    org_slug: String,
    #[serde(default)]
    corporation_name: String,
    admin_user: Option<AdminUser>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Provisioned {
    pub ok: bool,
    pub corporation_id: String,
    pub clerk_user_id: String,
    pub profile_id: String,
}

/// Existing Clerk user for `email`, or a newly created one.
async fn find_or_create_user(
    clerk: &ClerkClient,
    admin: &AdminUser,
    metadata: &Value,
) -> Result<String, ApiError> {
    if let Some(existing) = clerk.find_users_by_email(&admin.email).await?.into_iter().next() {
        return Ok(existing.id);
    }
    let new_user = NewClerkUser::from_full_name(&admin.email, &admin.full_name, metadata.clone());
    let created = clerk.create_user(&new_user).await?;
    tracing::info!(clerk_user_id = %created.id, "clerk user created for corporation admin");
    Ok(created.id)
}

/// `POST /api/webhooks/provision-admin`
///
/// Creates a corporation under a partner organization and makes the given
/// person its administrator, in Clerk and locally.
pub async fn provision_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Provisioned>, ApiError> {
    verify(&state, &headers, &body)?;
    let payload: Value = parse_json(&body)?;
    let request: ProvisionAdmin = serde_json::from_value(payload.clone())
        .map_err(|_| ApiError::bad_request("Missing required fields"))?;

    let org_slug = request.org_slug.trim();
    let corporation_name = request.corporation_name.trim();
    let admin = match request.admin_user {
        Some(admin)
            if !org_slug.is_empty()
                && !corporation_name.is_empty()
                && !admin.email.trim().is_empty() =>
        {
            admin
        }
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };
    let external_id = non_blank(admin.external_id.as_deref());

    let clerk = state.clerk()?;
    let org = clerk
        .find_organization_by_slug(org_slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Organization {org_slug} not found")))?;
    state
        .svc
        .upsert_organization(org_slug, org.name.as_deref())
        .await?;

    let corporation = state
        .svc
        .create_corporation(corporation_name, org_slug, external_id)
        .await?;

    let metadata = json!({
        "external_id": external_id,
        "corporation_id": corporation.id,
        "role": "corp:admin",
    });
    let clerk_user_id = find_or_create_user(clerk, &admin, &metadata).await?;
    clerk
        .ensure_org_membership(&org.id, &clerk_user_id, CORP_ADMIN_ORG_ROLE)
        .await?;
    clerk.update_public_metadata(&clerk_user_id, &metadata).await?;

    let profile = state
        .svc
        .upsert_profile(
            &clerk_user_id,
            non_blank(Some(admin.full_name.as_str())),
            Some(admin.email.trim()),
        )
        .await?;
    state
        .svc
        .upsert_corp_membership(&profile.id, &corporation.id, CorpRole::CorpAdmin, external_id)
        .await?;
    state
        .svc
        .insert_sync_log(
            SyncType::AdminProvisioned,
            &payload,
            corporation.org_id.as_deref(),
            true,
        )
        .await?;

    tracing::info!(
        corporation_id = %corporation.id,
        profile_id = %profile.id,
        org_slug,
        "corporation admin provisioned"
    );
    Ok(Json(Provisioned {
        ok: true,
        corporation_id: corporation.id,
        clerk_user_id,
        profile_id: profile.id,
    }))
}

#[derive(Debug, Deserialize)]
struct PaymentNotice {
    admin_external_id: Option<String>,
    cohort_external_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecorded {
    pub ok: bool,
    pub cohort_id: String,
}

/// `POST /api/webhooks/payment`
///
/// Marks a cohort paid once the paying administrator is confirmed as its owner.
pub async fn payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PaymentRecorded>, ApiError> {
    verify(&state, &headers, &body)?;
    let payload: Value = parse_json(&body)?;
    let missing = || ApiError::bad_request("Missing required fields: admin_external_id, cohort_external_id");
    let notice: PaymentNotice = serde_json::from_value(payload.clone()).map_err(|_| missing())?;
    let (Some(admin_external_id), Some(cohort_external_id)) = (
        non_blank(notice.admin_external_id.as_deref()),
        non_blank(notice.cohort_external_id.as_deref()),
    ) else {
        return Err(missing());
    };

    let entry = state
        .svc
        .insert_sync_log(SyncType::PaymentReceived, &payload, None, false)
        .await?;

    let admin = state
        .svc
        .find_corp_membership_by_external_id(admin_external_id, CorpRole::CorpAdmin)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Admin not found with external_id: {admin_external_id}"))
        })?;
    let cohort = state
        .svc
        .find_cohort_by_external_id(cohort_external_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("Cohort not found with external_id: {cohort_external_id}"))
        })?;

    if cohort.admin_id.as_deref() != Some(admin.user_id.as_str()) {
        return Err(ApiError::Forbidden("Admin does not match cohort admin_id".into()));
    }

    let cohort = state.svc.mark_cohort_paid(&cohort.id).await?;
    let org_id = match cohort.corporation_id.as_deref() {
        Some(corporation_id) => state.svc.get_corporation(corporation_id).await?.org_id,
        None => None,
    };
    state
        .svc
        .mark_sync_log_processed(&entry.id, org_id.as_deref())
        .await?;

    tracing::info!(cohort_id = %cohort.id, "cohort payment recorded");
    Ok(Json(PaymentRecorded {
        ok: true,
        cohort_id: cohort.id,
    }))
}
