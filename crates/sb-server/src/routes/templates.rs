//! Public template catalogue, served with permissive CORS to the marketing site.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

use sb_core::entities::Template;
use sb_db::repos::template::TemplateScoreTotal;

use crate::error::ApiError;
use crate::state::AppState;

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// `GET /api/templates`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Template>>, ApiError> {
    Ok(Json(state.svc.list_templates().await?))
}

/// `GET /api/templates/{template_id}/score-total`
pub async fn score_total(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateScoreTotal>, ApiError> {
    Ok(Json(state.svc.template_score_total(&template_id).await?))
}
