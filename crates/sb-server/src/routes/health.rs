use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /health`: liveness plus a database round trip.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut rows = state
        .svc
        .db()
        .query_with("SELECT 1", || ())
        .await
        .map_err(|e| ApiError::Internal(format!("database unavailable: {e}")))?;
    rows.next()
        .await
        .map_err(|e| ApiError::Internal(format!("database unavailable: {e}")))?;
    Ok(Json(json!({ "status": "ok", "remote": state.svc.db().is_remote() })))
}
