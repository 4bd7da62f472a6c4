//! Questionnaire and benchmark endpoints under `/api/assessment`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use sb_core::benchmark::{BenchmarkFilter, GroupBenchmark, SkillBenchmark};
use sb_core::entities::{AssessmentSkillScore, Question, SkillGroup, Template};
use sb_core::overview::{TimeEstimate, estimate_minutes, sort_groups_by_first_question};
use sb_db::helpers::non_blank;
use sb_db::repos::assessment::SaveAnswer;
use sb_db::repos::lookups::FilterOptions;

use super::{OK, OkBody, query_value, resolve_template};
use crate::error::ApiError;
use crate::extract::{CurrentUser, Session};
use crate::state::AppState;

type QueryPairs = Query<Vec<(String, String)>>;

fn filter_from(pairs: &[(String, String)]) -> Result<BenchmarkFilter, ApiError> {
    Ok(BenchmarkFilter::from_pairs(
        pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    )?)
}

/// Profile ID of the caller, used to keep them out of their own benchmark.
async fn own_profile_id(state: &AppState, clerk_user_id: &str) -> Result<Option<String>, ApiError> {
    Ok(state
        .svc
        .find_profile_by_clerk_id(clerk_user_id)
        .await?
        .map(|p| p.id))
}

/// `GET /api/assessment/benchmark`
pub async fn benchmark(
    State(state): State<AppState>,
    Session(identity): Session,
    Query(pairs): QueryPairs,
) -> Result<Json<Option<GroupBenchmark>>, ApiError> {
    let (Some(template_id), Some(skill_group_id)) = (
        query_value(&pairs, "templateId"),
        query_value(&pairs, "skillGroupId"),
    ) else {
        return Err(ApiError::bad_request("templateId and skillGroupId are required"));
    };
    let filter = filter_from(&pairs)?;
    let exclude = own_profile_id(&state, &identity.user_id).await?;

    let result = state
        .svc
        .skill_group_benchmark(template_id, skill_group_id, &filter, exclude.as_deref())
        .await?;
    Ok(Json(result))
}

/// `GET /api/assessment/skill-benchmark`
pub async fn skill_benchmark(
    State(state): State<AppState>,
    Session(identity): Session,
    Query(pairs): QueryPairs,
) -> Result<Json<SkillBenchmark>, ApiError> {
    let (Some(template_id), Some(template_skill_id)) = (
        query_value(&pairs, "templateId"),
        query_value(&pairs, "templateSkillId"),
    ) else {
        return Err(ApiError::bad_request("templateId and templateSkillId are required"));
    };
    let filter = filter_from(&pairs)?;
    let exclude = own_profile_id(&state, &identity.user_id).await?;

    let result = state
        .svc
        .skill_benchmark(template_id, template_skill_id, &filter, exclude.as_deref())
        .await?;
    Ok(Json(result))
}

/// `GET /api/assessment/filter-options`
pub async fn filter_options(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<FilterOptions>, ApiError> {
    Ok(Json(state.svc.filter_options().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerBody {
    pub assessment_id: String,
    pub template_skill_id: String,
    pub points: f64,
    #[serde(default)]
    pub open_ended_response: Option<String>,
}

/// `POST /api/assessment/save-answer`
pub async fn save_answer(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SaveAnswerBody>, JsonRejection>,
) -> Result<Json<OkBody>, ApiError> {
    let Json(body) = payload?;
    let answer = SaveAnswer {
        assessment_id: &body.assessment_id,
        template_skill_id: &body.template_skill_id,
        points: body.points,
        open_ended_response: non_blank(body.open_ended_response.as_deref()),
    };
    state.svc.save_answer(&user.profile.id, &answer).await?;
    Ok(Json(OK))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
    pub assessment_id: String,
}

/// `POST /api/assessment/submit`
pub async fn submit(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<OkBody>, ApiError> {
    let Json(body) = payload?;
    state
        .svc
        .submit_assessment(&body.assessment_id, &user.profile.id)
        .await?;
    Ok(Json(OK))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub template_id: String,
    pub title: String,
    pub question_count: i64,
    pub section_count: i64,
    pub time_estimate: TimeEstimate,
    pub time_label: String,
    /// Attempt to resume, if the user has one open.
    pub in_progress_assessment_id: Option<String>,
}

/// `GET /api/assessment/overview`
pub async fn overview(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Overview>, ApiError> {
    let template_id = resolve_template(&state, &user.profile.id).await?;
    let template = state.svc.get_template(&template_id).await?;
    let question_count = state.svc.count_questions(&template_id).await?;
    let section_count = state.svc.count_skill_groups(&template_id).await?;
    let in_progress = state
        .svc
        .find_in_progress_assessment(&user.profile.id, &template_id)
        .await?;

    let estimate = estimate_minutes(u32::try_from(question_count).unwrap_or(u32::MAX));
    Ok(Json(Overview {
        template_id,
        title: template.title,
        question_count,
        section_count,
        time_label: estimate.label(),
        time_estimate: estimate,
        in_progress_assessment_id: in_progress.map(|a| a.id),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub assessment_id: String,
    pub resumed: bool,
    pub template: Template,
    pub skill_groups: Vec<SkillGroup>,
    pub questions: Vec<Question>,
    pub answers: Vec<AssessmentSkillScore>,
}

/// `POST /api/assessment/start`: start or resume the user's attempt.
pub async fn start(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<StartResponse>, ApiError> {
    let template_id = resolve_template(&state, &user.profile.id).await?;
    let template = state.svc.get_template(&template_id).await?;
    let (assessment, resumed) = state
        .svc
        .start_or_resume_assessment(&user.profile.id, &template_id)
        .await?;

    let groups = state.svc.list_skill_groups(&template_id).await?;
    let questions = state.svc.list_questions(&template_id).await?;
    let answers = if resumed {
        state.svc.list_answers(&assessment.id).await?
    } else {
        Vec::new()
    };

    tracing::info!(assessment_id = %assessment.id, resumed, "assessment opened");
    Ok(Json(StartResponse {
        assessment_id: assessment.id,
        resumed,
        template,
        skill_groups: sort_groups_by_first_question(&groups, &questions),
        questions,
        answers,
    }))
}
