//! Account settings, profile management, and the `/api/me` summary.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sb_core::entities::{Profile, UserDimensions, UserSettings};
use sb_core::enums::{BenchmarkDefault, DashboardOption, SummaryReportMode, UserRole};
use sb_db::helpers::non_blank;

use super::{OK, OkBody};
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Settings as the account page reads and writes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub summary_report_mode: SummaryReportMode,
    pub dashboard_option: DashboardOption,
    pub percentage_based_scoring: bool,
    pub benchmark_default: BenchmarkDefault,
}

impl From<UserSettings> for SettingsView {
    fn from(s: UserSettings) -> Self {
        Self {
            summary_report_mode: s.summary_report_mode,
            dashboard_option: s.dashboard_option,
            percentage_based_scoring: s.percentage_based_scoring,
            benchmark_default: s.benchmark_default,
        }
    }
}

/// Settings update. Omitted fields reset to their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBody {
    pub summary_report_mode: Option<SummaryReportMode>,
    pub dashboard_option: Option<DashboardOption>,
    pub percentage_based_scoring: Option<bool>,
    pub benchmark_default: Option<BenchmarkDefault>,
}

impl SettingsBody {
    fn into_settings(self) -> UserSettings {
        let defaults = UserSettings::default();
        UserSettings {
            summary_report_mode: self.summary_report_mode.unwrap_or(defaults.summary_report_mode),
            dashboard_option: self.dashboard_option.unwrap_or(defaults.dashboard_option),
            percentage_based_scoring: self
                .percentage_based_scoring
                .unwrap_or(defaults.percentage_based_scoring),
            benchmark_default: self.benchmark_default.unwrap_or(defaults.benchmark_default),
        }
    }
}

/// `GET /api/account/settings`
pub async fn get_settings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<SettingsView>, ApiError> {
    let settings = state.svc.get_user_settings(&user.profile.id).await?;
    Ok(Json(settings.into()))
}

/// `POST /api/account/settings`
pub async fn update_settings(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SettingsBody>, JsonRejection>,
) -> Result<Json<OkBody>, ApiError> {
    let Json(body) = payload?;
    state
        .svc
        .upsert_user_settings(&user.profile.id, &body.into_settings())
        .await?;
    Ok(Json(OK))
}

/// Profile name and benchmark dimensions from the account form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementBody {
    pub full_name: Option<String>,
    pub country: Option<String>,
    pub sub_region: Option<String>,
    pub job_role: Option<String>,
    pub industry: Option<String>,
    /// Number or numeric string; the form sends either.
    pub years_experience: Option<Value>,
    pub education_level: Option<String>,
    pub functional_area: Option<String>,
    pub seniority_level: Option<String>,
}

fn parse_years(value: Option<&Value>) -> Result<Option<i64>, ApiError> {
    let invalid = || ApiError::bad_request("yearsExperience must be a whole number");
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(invalid),
        Some(Value::String(s)) => match s.trim() {
            "" => Ok(None),
            trimmed => trimmed.parse().map(Some).map_err(|_| invalid()),
        },
        Some(_) => Err(invalid()),
    }
}

fn owned(value: Option<&String>) -> Option<String> {
    non_blank(value.map(String::as_str)).map(String::from)
}

impl ManagementBody {
    fn dimensions(&self, user_id: &str) -> Result<UserDimensions, ApiError> {
        Ok(UserDimensions {
            user_id: user_id.to_string(),
            country: owned(self.country.as_ref()),
            sub_region: owned(self.sub_region.as_ref()),
            job_role: owned(self.job_role.as_ref()),
            industry: owned(self.industry.as_ref()),
            years_experience: parse_years(self.years_experience.as_ref())?,
            education_level: owned(self.education_level.as_ref()),
            functional_area: owned(self.functional_area.as_ref()),
            seniority_level: owned(self.seniority_level.as_ref()),
        })
    }
}

/// `POST /api/account/management`
pub async fn update_management(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<ManagementBody>, JsonRejection>,
) -> Result<Json<OkBody>, ApiError> {
    let Json(body) = payload?;
    let dimensions = body.dimensions(&user.profile.id)?;

    state
        .svc
        .update_profile_name(&user.profile.id, non_blank(body.full_name.as_deref()))
        .await?;
    state.svc.upsert_user_dimensions(&dimensions).await?;
    Ok(Json(OK))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub profile: Profile,
    pub role: UserRole,
    pub org_slug: Option<String>,
    pub dimensions: Option<UserDimensions>,
    pub settings: SettingsView,
}

/// `GET /api/me`
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<Me>, ApiError> {
    let role = state.svc.get_user_role(&user.profile.id).await?;
    let dimensions = state.svc.get_user_dimensions(&user.profile.id).await?;
    let settings = state.svc.get_user_settings(&user.profile.id).await?;
    Ok(Json(Me {
        role,
        org_slug: user.identity.org_slug,
        dimensions,
        settings: settings.into(),
        profile: user.profile,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn years_accept_number_or_numeric_string() {
        assert_eq!(parse_years(Some(&json!(7))).unwrap(), Some(7));
        assert_eq!(parse_years(Some(&json!(" 12 "))).unwrap(), Some(12));
        assert_eq!(parse_years(Some(&json!(""))).unwrap(), None);
        assert_eq!(parse_years(None).unwrap(), None);
        assert!(parse_years(Some(&json!("ten"))).is_err());
        assert!(parse_years(Some(&json!(2.5))).is_err());
    }

    #[test]
    fn omitted_settings_fall_back_to_defaults() {
        let body: SettingsBody = serde_json::from_value(json!({"benchmarkDefault": "country"})).unwrap();
        let settings = body.into_settings();
        assert_eq!(settings.benchmark_default, BenchmarkDefault::Country);
        assert_eq!(settings.dashboard_option, DashboardOption::Insights);
        assert!(settings.percentage_based_scoring);
    }

    #[test]
    fn blank_dimensions_become_none() {
        let body: ManagementBody = serde_json::from_value(json!({
            "country": "Canada",
            "industry": "  ",
            "yearsExperience": "5"
        }))
        .unwrap();
        let dims = body.dimensions("prf-1").unwrap();
        assert_eq!(dims.country.as_deref(), Some("Canada"));
        assert_eq!(dims.industry, None);
        assert_eq!(dims.years_experience, Some(5));
    }
}
