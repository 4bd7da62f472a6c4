use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named questionnaire definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Template {
    pub id: String,
    pub title: String,
}

/// A named cluster of related questions within a template.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SkillGroup {
    pub id: String,
    pub template_id: String,
    pub name: String,
}

/// A single question (stored as a template skill) with its answer options.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Question {
    pub id: String,
    pub name: String,
    pub description: String,
    pub skill_group_id: Option<String>,
    pub max_points: f64,
    pub order_index: i64,
    pub options: Vec<ResponseOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ResponseOption {
    pub id: String,
    pub template_skill_id: String,
    pub response_text: String,
    pub point_value: f64,
    pub display_order: i64,
}
