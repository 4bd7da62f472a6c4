use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{BenchmarkDefault, DashboardOption, SummaryReportMode};

/// Local mirror of an identity-provider user. One per `clerk_user_id`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub clerk_user_id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Demographic and geographic dimensions a user reports about themselves.
///
/// These are the columns benchmark filters match against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UserDimensions {
    pub user_id: String,
    pub country: Option<String>,
    pub sub_region: Option<String>,
    pub job_role: Option<String>,
    pub industry: Option<String>,
    pub years_experience: Option<i64>,
    pub education_level: Option<String>,
    pub functional_area: Option<String>,
    pub seniority_level: Option<String>,
}

/// Per-user display preferences.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UserSettings {
    pub summary_report_mode: SummaryReportMode,
    pub dashboard_option: DashboardOption,
    pub percentage_based_scoring: bool,
    pub benchmark_default: BenchmarkDefault,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            summary_report_mode: SummaryReportMode::default(),
            dashboard_option: DashboardOption::default(),
            percentage_based_scoring: true,
            benchmark_default: BenchmarkDefault::default(),
        }
    }
}
