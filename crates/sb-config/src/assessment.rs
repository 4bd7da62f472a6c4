//! Assessment defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssessmentConfig {
    /// Template used when a user belongs to no cohort.
    #[serde(default)]
    pub default_template_id: String,
}

impl AssessmentConfig {
    pub fn default_template(&self) -> Option<&str> {
        Some(self.default_template_id.as_str()).filter(|id| !id.is_empty())
    }
}
