//! `POST /api/webhooks/sanity`: mirrors learning content documents from the CMS.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sb_auth::webhook::{SANITY_SIGNATURE, verify_sanity_signature};
use sb_db::helpers::non_blank;
use sb_db::repos::learning::{NewLearningPath, NewLearningPathRule};

use super::{header, parse_json};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearningPathDoc {
    #[serde(rename = "_id")]
    id: String,
    org_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Reference {
    #[serde(rename = "_ref")]
    target: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearningPathRuleDoc {
    learning_path: Option<Reference>,
    org_id: Option<String>,
    template_id: Option<String>,
    min_score: Option<f64>,
    max_score: Option<f64>,
    priority: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncOutcome {
    Success {
        #[serde(rename = "type")]
        doc_type: String,
        id: String,
    },
    Ignored { message: String },
}

fn owned(value: Option<&str>) -> Option<String> {
    non_blank(value).map(String::from)
}

fn document<T: serde::de::DeserializeOwned>(doc: Value, doc_type: &str) -> Result<T, ApiError> {
    serde_json::from_value(doc)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {doc_type} document: {e}")))
}

pub async fn sanity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncOutcome>, ApiError> {
    verify_sanity_signature(
        &state.config.webhooks.sanity_secret,
        header(&headers, SANITY_SIGNATURE),
        &body,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "sanity webhook rejected");
        ApiError::InvalidSignature
    })?;

    let doc: Value = parse_json(&body)?;
    let doc_type = doc
        .get("_type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    tracing::info!(doc_type = %doc_type, doc_id = ?doc.get("_id"), "sanity webhook received");

    let id = match doc_type.as_str() {
        "learningPath" => sync_learning_path(&state, document(doc, &doc_type)?).await?,
        "learningPathRule" => sync_learning_path_rule(&state, document(doc, &doc_type)?).await?,
        _ => {
            return Ok(Json(SyncOutcome::Ignored {
                message: format!("Unhandled document type: {doc_type}"),
            }));
        }
    };
    Ok(Json(SyncOutcome::Success { doc_type, id }))
}

async fn sync_learning_path(state: &AppState, doc: LearningPathDoc) -> Result<String, ApiError> {
    let title = owned(doc.title.as_deref())
        .ok_or_else(|| ApiError::bad_request("learningPath requires a title"))?;
    let path = state
        .svc
        .upsert_learning_path(&NewLearningPath {
            external_id: doc.id,
            org_id: owned(doc.org_id.as_deref()),
            title,
            description: owned(doc.description.as_deref()),
            url: owned(doc.url.as_deref()),
            metadata: doc.metadata.filter(|m| !m.is_null()),
        })
        .await?;
    tracing::info!(learning_path_id = %path.id, external_id = %path.external_id, "learning path synced");
    Ok(path.id)
}

async fn sync_learning_path_rule(
    state: &AppState,
    doc: LearningPathRuleDoc,
) -> Result<String, ApiError> {
    let reference = doc
        .learning_path
        .ok_or_else(|| ApiError::bad_request("learningPathRule requires a learningPath reference"))?;
    let (Some(min_score), Some(max_score)) = (doc.min_score, doc.max_score) else {
        return Err(ApiError::bad_request("learningPathRule requires minScore and maxScore"));
    };
    let learning_path_id = state
        .svc
        .resolve_learning_path_id(&reference.target)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Learning path not found for reference: {}",
                reference.target
            ))
        })?;

    let rule = state
        .svc
        .insert_learning_path_rule(&NewLearningPathRule {
            org_id: owned(doc.org_id.as_deref()),
            template_id: owned(doc.template_id.as_deref()),
            skill_group_id: None,
            template_skill_id: None,
            min_score,
            max_score,
            learning_path_id,
            priority: doc.priority.unwrap_or(0),
        })
        .await?;
    tracing::info!(rule_id = %rule.id, "learning path rule created");
    Ok(rule.id)
}
