//! Questionnaire presentation helpers: time estimates and section ordering.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Question, SkillGroup};

/// Estimated completion time range, in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimeEstimate {
    pub low: u32,
    pub high: u32,
}

/// Half a minute to three quarters of a minute per question, at least one minute.
#[must_use]
pub const fn estimate_minutes(question_count: u32) -> TimeEstimate {
    let low = question_count.div_ceil(2);
    let high = question_count.saturating_mul(3).div_ceil(4);
    TimeEstimate {
        low: if low == 0 { 1 } else { low },
        high: if high == 0 { 1 } else { high },
    }
}

impl TimeEstimate {
    #[must_use]
    pub fn label(&self) -> String {
        if self.low == self.high {
            format!("~{} mins", self.low)
        } else {
            format!("{}\u{2013}{} mins", self.low, self.high)
        }
    }
}

/// Order skill groups by the position of their earliest question.
///
/// Groups with no questions go last, keeping their relative order.
#[must_use]
pub fn sort_groups_by_first_question(groups: &[SkillGroup], questions: &[Question]) -> Vec<SkillGroup> {
    let mut first: HashMap<&str, i64> = HashMap::new();
    for question in questions {
        if let Some(gid) = question.skill_group_id.as_deref() {
            first
                .entry(gid)
                .and_modify(|min| *min = (*min).min(question.order_index))
                .or_insert(question.order_index);
        }
    }

    let mut sorted = groups.to_vec();
    sorted.sort_by_key(|g| first.get(g.id.as_str()).copied().unwrap_or(i64::MAX));
    sorted
}
