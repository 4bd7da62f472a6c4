use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SyncType;

/// Record of an inbound integration webhook and whether it was applied.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SyncLogEntry {
    pub id: String,
    pub sync_type: SyncType,
    pub payload: serde_json::Value,
    pub org_id: Option<String>,
    pub processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
