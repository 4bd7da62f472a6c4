use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AssessmentStatus;

/// One attempt by a user at a template's questionnaire.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Assessment {
    pub id: String,
    pub user_id: String,
    pub template_id: String,
    pub status: AssessmentStatus,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Calendar year of `submitted_at`, kept as its own column for benchmark filtering.
    pub submitted_year: Option<i32>,
}

/// The recorded answer to one question within one attempt.
///
/// Keyed by `(assessment_id, template_skill_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AssessmentSkillScore {
    pub assessment_id: String,
    pub template_skill_id: String,
    pub points: f64,
    /// Score used for aggregation. Mirrors `points` until reviewer adjustments exist.
    pub final_score: Option<f64>,
    pub open_ended_response: Option<String>,
}
