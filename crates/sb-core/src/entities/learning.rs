use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Recommended learning content, authored in the CMS and mirrored here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LearningPath {
    pub id: String,
    /// CMS document ID.
    pub external_id: String,
    pub org_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Maps a score range to a learning path.
///
/// Scores are percentages. `org_id` / `template_id` narrow the rule when set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LearningPathRule {
    pub id: String,
    pub org_id: Option<String>,
    pub template_id: Option<String>,
    pub skill_group_id: Option<String>,
    pub template_skill_id: Option<String>,
    pub min_score: f64,
    pub max_score: f64,
    pub learning_path_id: String,
    pub priority: i64,
}
