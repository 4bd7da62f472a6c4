//! Score aggregation: per-question points → per-skill-group and per-template totals.
//!
//! Only answered questions contribute to `total_possible`, so a partially
//! answered group is scored against what was actually asked of the user.
//! `question_count` carries the full size of the group for completion display.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AssessmentSkillScore, Question, SkillGroup};

/// Aggregated result for one skill group.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupScore {
    pub id: String,
    pub name: String,
    pub user_score: f64,
    pub total_possible: f64,
    pub answered_count: u32,
    pub question_count: u32,
    pub percentage: i64,
}

/// Score for a single answered question.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SkillScore {
    pub name: String,
    pub group_id: String,
    pub template_skill_id: String,
    pub max_points: f64,
    pub raw_score: f64,
}

/// Full score breakdown for one assessment attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub groups: Vec<GroupScore>,
    pub skills: Vec<SkillScore>,
    pub user_score: f64,
    pub total_possible: f64,
    pub percentage: i64,
}

#[derive(Default)]
struct GroupAccumulator {
    total: f64,
    possible: f64,
    answered: u32,
}

/// Round half up, matching how percentages are displayed to users.
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = (value + 0.5).floor() as i64;
    rounded
}

/// `score / total` as a whole percentage. Zero when `total` is not positive.
#[must_use]
pub fn percentage(score: f64, total: f64) -> i64 {
    if total <= 0.0 {
        return 0;
    }
    round_half_up(score / total * 100.0)
}

/// Percentage-point difference between a user and a benchmark.
#[must_use]
pub const fn compare_to_benchmark(user_pct: i64, benchmark_pct: i64) -> i64 {
    user_pct - benchmark_pct
}

/// Aggregate an attempt's answers into per-group and template totals.
///
/// `groups` fixes the output order. Answers whose question is unknown, has no
/// skill group, or has no `final_score` are skipped. Groups without answers
/// are still reported, with zero totals.
#[must_use]
pub fn aggregate_scores(
    groups: &[SkillGroup],
    questions: &[Question],
    answers: &[AssessmentSkillScore],
) -> ScoreSummary {
    let by_id: HashMap<&str, &Question> = questions.iter().map(|q| (q.id.as_str(), q)).collect();

    let mut question_counts: HashMap<&str, u32> = HashMap::new();
    for question in questions {
        if let Some(gid) = question.skill_group_id.as_deref() {
            *question_counts.entry(gid).or_default() += 1;
        }
    }

    let mut accumulators: HashMap<&str, GroupAccumulator> = HashMap::new();
    let mut skills = Vec::new();

    for answer in answers {
        let Some(question) = by_id.get(answer.template_skill_id.as_str()) else {
            continue;
        };
        let (Some(gid), Some(score)) = (question.skill_group_id.as_deref(), answer.final_score)
        else {
            continue;
        };

        let acc = accumulators.entry(gid).or_default();
        acc.total += score;
        acc.possible += question.max_points;
        acc.answered += 1;

        skills.push(SkillScore {
            name: question.name.clone(),
            group_id: gid.to_string(),
            template_skill_id: answer.template_skill_id.clone(),
            max_points: question.max_points,
            raw_score: score,
        });
    }

    let groups: Vec<GroupScore> = groups
        .iter()
        .map(|group| {
            let acc = accumulators.remove(group.id.as_str()).unwrap_or_default();
            GroupScore {
                id: group.id.clone(),
                name: group.name.clone(),
                user_score: acc.total,
                total_possible: acc.possible,
                answered_count: acc.answered,
                question_count: question_counts.get(group.id.as_str()).copied().unwrap_or(0),
                percentage: percentage(acc.total, acc.possible),
            }
        })
        .collect();

    let user_score: f64 = groups.iter().map(|g| g.user_score).sum();
    let total_possible: f64 = groups.iter().map(|g| g.total_possible).sum();

    ScoreSummary {
        groups,
        skills,
        user_score,
        total_possible,
        percentage: percentage(user_score, total_possible),
    }
}
