//! Inbound integration webhooks.
//!
//! Every handler reads the raw body first: signatures cover the exact bytes.

pub mod clerk;
pub mod partner;
pub mod sanity;

use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub(crate) fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {e}")))
}
