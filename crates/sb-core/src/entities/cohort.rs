use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::PaymentStatus;

/// An administrative grouping of users sharing a template and reporting line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Cohort {
    pub id: String,
    pub name: String,
    pub template_id: Option<String>,
    pub admin_id: Option<String>,
    pub corporation_id: Option<String>,
    pub external_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CohortMember {
    pub cohort_id: String,
    pub user_id: String,
    pub status: String,
    pub added_at: DateTime<Utc>,
    pub added_by: Option<String>,
    pub cohort_group: Option<String>,
}
