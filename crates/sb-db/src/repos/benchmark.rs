//! Benchmark queries over other users' submitted attempts.
//!
//! SQL narrows the cohort (template, submitted status, filters, excluded user)
//! and returns raw per-attempt numbers; `sb_core::benchmark` summarizes them.

use sb_core::benchmark::{
    BenchmarkFilter, GroupBenchmark, SkillBenchmark, summarize_group_scores, summarize_skill_scores,
};

use crate::error::DatabaseError;
use crate::repos::template::IN_TEMPLATE;
use crate::service::SkillService;

/// Joins every benchmark query needs to apply dimension filters.
const COHORT_JOINS: &str = "
    JOIN assessments a ON a.id = s.assessment_id
    LEFT JOIN user_dimensions d ON d.user_id = a.user_id
    LEFT JOIN countries c ON c.country_name = d.country";

/// Build `AND ...` clauses for the filter, numbering placeholders from `next_idx`.
fn filter_clauses(
    filter: &BenchmarkFilter,
    exclude_user: Option<&str>,
    mut next_idx: usize,
) -> (String, Vec<libsql::Value>) {
    let mut sql = String::new();
    let mut params: Vec<libsql::Value> = Vec::new();
    let mut push = |clause: &str, value: libsql::Value| {
        sql.push_str(&format!(" AND {clause} ?{next_idx}"));
        params.push(value);
        next_idx += 1;
    };

    if let Some(user) = exclude_user {
        push("a.user_id !=", user.into());
    }
    if let Some(year) = filter.submitted_year {
        push("a.submitted_year =", i64::from(year).into());
    }
    if let Some(v) = &filter.country {
        push("d.country =", v.as_str().into());
    }
    if let Some(v) = &filter.industry {
        push("d.industry =", v.as_str().into());
    }
    if let Some(v) = &filter.job_level {
        push("d.seniority_level =", v.as_str().into());
    }
    if let Some(v) = &filter.functional_area {
        push("d.functional_area =", v.as_str().into());
    }
    if let Some(v) = &filter.role {
        push("d.job_role =", v.as_str().into());
    }
    if let Some(v) = &filter.region {
        push("c.region =", v.as_str().into());
    }
    if let Some(v) = &filter.sub_region {
        push("COALESCE(d.sub_region, c.sub_region) =", v.as_str().into());
    }
    if let Some(years) = filter.years_experience {
        push("d.years_experience =", years.into());
    }
    if let Some(v) = &filter.education_level {
        push("d.education_level =", v.as_str().into());
    }
    (sql, params)
}

impl SkillService {
    /// Mean summed score of a skill group across matching submitted attempts.
    ///
    /// An attempt counts when it answered at least one question of the group.
    /// Returns `None` when no attempt matches.
    pub async fn skill_group_benchmark(
        &self,
        template_id: &str,
        skill_group_id: &str,
        filter: &BenchmarkFilter,
        exclude_user: Option<&str>,
    ) -> Result<Option<GroupBenchmark>, DatabaseError> {
        let total_sql = format!(
            "SELECT COALESCE(SUM(ts.max_points), 0.0) FROM template_skills ts
             WHERE {IN_TEMPLATE} AND ts.skill_group_id = ?2"
        );
        let mut rows = self
            .db()
            .query_with(&total_sql, || [template_id, skill_group_id])
            .await?;
        let total_possible = match rows.next().await? {
            Some(row) => row.get::<f64>(0)?,
            None => 0.0,
        };

        let (clauses, extra) = filter_clauses(filter, exclude_user, 3);
        let sql = format!(
            "SELECT COALESCE(SUM(s.final_score), 0.0)
             FROM assessment_skill_scores s
             JOIN template_skills ts ON ts.id = s.template_skill_id
             {COHORT_JOINS}
             WHERE a.template_id = ?1 AND a.status = 'submitted'
               AND ts.skill_group_id = ?2 AND s.final_score IS NOT NULL
               {clauses}
             GROUP BY a.id"
        );
        let mut params: Vec<libsql::Value> = vec![template_id.into(), skill_group_id.into()];
        params.extend(extra);

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut per_attempt = Vec::new();
        while let Some(row) = rows.next().await? {
            per_attempt.push(row.get::<f64>(0)?);
        }

        tracing::debug!(
            template_id,
            skill_group_id,
            filter = %filter.stable_key(),
            n = per_attempt.len(),
            "skill group benchmark"
        );
        if per_attempt.is_empty() {
            return Ok(None);
        }
        Ok(Some(summarize_group_scores(&per_attempt, total_possible)))
    }

    /// Distribution of one question's score across matching submitted attempts.
    pub async fn skill_benchmark(
        &self,
        template_id: &str,
        template_skill_id: &str,
        filter: &BenchmarkFilter,
        exclude_user: Option<&str>,
    ) -> Result<SkillBenchmark, DatabaseError> {
        let (clauses, extra) = filter_clauses(filter, exclude_user, 3);
        let sql = format!(
            "SELECT s.final_score
             FROM assessment_skill_scores s
             {COHORT_JOINS}
             WHERE a.template_id = ?1 AND a.status = 'submitted'
               AND s.template_skill_id = ?2 AND s.final_score IS NOT NULL
               {clauses}"
        );
        let mut params: Vec<libsql::Value> = vec![template_id.into(), template_skill_id.into()];
        params.extend(extra);

        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;
        let mut samples = Vec::new();
        while let Some(row) = rows.next().await? {
            samples.push(row.get::<f64>(0)?);
        }
        Ok(summarize_skill_scores(&samples))
    }
}
