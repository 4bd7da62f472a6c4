//! Results page and learning path recommendations.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sb_core::entities::{Assessment, LearningPath, UserSettings};
use sb_core::recommend::{RuleScope, match_learning_paths};
use sb_core::scoring::{ScoreSummary, aggregate_scores};

use super::resolve_template;
use crate::error::ApiError;
use crate::extract::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsQuery {
    pub template_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    pub has_results: bool,
    pub template_id: String,
    pub assessment_id: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub submitted_year: Option<i32>,
    pub settings: UserSettings,
    #[serde(flatten)]
    pub summary: Option<ScoreSummary>,
}

/// Score the user's latest submitted attempt of `template_id`.
async fn latest_summary(
    state: &AppState,
    profile_id: &str,
    template_id: &str,
) -> Result<Option<(Assessment, ScoreSummary)>, ApiError> {
    let Some(assessment) = state
        .svc
        .latest_submitted_assessment(profile_id, template_id)
        .await?
    else {
        return Ok(None);
    };

    let groups = state.svc.list_skill_groups(template_id).await?;
    let questions = state.svc.list_questions(template_id).await?;
    let answers = state.svc.list_answers(&assessment.id).await?;
    let summary = aggregate_scores(&groups, &questions, &answers);
    Ok(Some((assessment, summary)))
}

async fn template_for(
    state: &AppState,
    profile_id: &str,
    requested: Option<String>,
) -> Result<String, ApiError> {
    match requested.filter(|t| !t.trim().is_empty()) {
        Some(template_id) => Ok(template_id),
        None => resolve_template(state, profile_id).await,
    }
}

/// `GET /api/results`
pub async fn results(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ResultsQuery>, QueryRejection>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let Query(query) = query?;
    let template_id = template_for(&state, &user.profile.id, query.template_id).await?;
    let settings = state.svc.get_user_settings(&user.profile.id).await?;

    let response = match latest_summary(&state, &user.profile.id, &template_id).await? {
        Some((assessment, summary)) => ResultsResponse {
            has_results: true,
            template_id,
            assessment_id: Some(assessment.id),
            submitted_at: assessment.submitted_at,
            submitted_year: assessment.submitted_year,
            settings,
            summary: Some(summary),
        },
        None => ResultsResponse {
            has_results: false,
            template_id,
            assessment_id: None,
            submitted_at: None,
            submitted_year: None,
            settings,
            summary: None,
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    /// Overall percentage the paths were matched against.
    pub score_percentage: Option<i64>,
    pub paths: Vec<LearningPath>,
}

/// `GET /api/learning-paths/recommended`
pub async fn recommended_learning_paths(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ResultsQuery>, QueryRejection>,
) -> Result<Json<Recommendations>, ApiError> {
    let Query(query) = query?;
    let template_id = template_for(&state, &user.profile.id, query.template_id).await?;
    let Some((_, summary)) = latest_summary(&state, &user.profile.id, &template_id).await? else {
        return Ok(Json(Recommendations {
            score_percentage: None,
            paths: Vec::new(),
        }));
    };

    let memberships = state.svc.list_org_memberships(&user.profile.id).await?;
    let org_id = memberships.first().map(|m| m.org_id.as_str());
    let rules = state
        .svc
        .list_learning_path_rules(org_id, Some(&template_id))
        .await?;

    #[allow(clippy::cast_precision_loss)]
    let score = summary.percentage as f64;
    let scope = RuleScope {
        org_id,
        template_id: Some(&template_id),
    };
    let ids = match_learning_paths(&rules, score, scope);
    let paths = state.svc.get_learning_paths(&ids).await?;

    tracing::debug!(score = summary.percentage, matched = paths.len(), "learning paths recommended");
    Ok(Json(Recommendations {
        score_percentage: Some(summary.percentage),
        paths,
    }))
}
