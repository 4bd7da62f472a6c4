//! Assessment repository: attempts, answer capture and submission.

use chrono::{Datelike, Utc};

use sb_core::entities::{Assessment, AssessmentSkillScore};
use sb_core::enums::AssessmentStatus;
use sb_core::ids::PREFIX_ASSESSMENT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::SkillService;

const ASSESSMENT_COLUMNS: &str =
    "id, user_id, template_id, status, started_at, submitted_at, submitted_year";

/// One answer as sent by the questionnaire.
#[derive(Debug, Clone)]
pub struct SaveAnswer<'a> {
    pub assessment_id: &'a str,
    pub template_skill_id: &'a str,
    pub points: f64,
    pub open_ended_response: Option<&'a str>,
}

fn row_to_assessment(row: &libsql::Row) -> Result<Assessment, DatabaseError> {
    Ok(Assessment {
        id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        template_id: row.get::<String>(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        started_at: parse_datetime(&row.get::<String>(4)?)?,
        submitted_at: parse_optional_datetime(get_opt_string(row, 5)?.as_deref())?,
        submitted_year: row
            .get::<Option<i64>>(6)?
            .map(i32::try_from)
            .transpose()
            .map_err(|e| DatabaseError::Query(format!("submitted_year out of range: {e}")))?,
    })
}

fn row_to_answer(row: &libsql::Row) -> Result<AssessmentSkillScore, DatabaseError> {
    Ok(AssessmentSkillScore {
        assessment_id: row.get::<String>(0)?,
        template_skill_id: row.get::<String>(1)?,
        points: row.get::<f64>(2)?,
        final_score: row.get::<Option<f64>>(3)?,
        open_ended_response: get_opt_string(row, 4)?,
    })
}

impl SkillService {
    /// Return the user's in-progress attempt for a template, creating one if
    /// none exists. The flag is `true` when an existing attempt was resumed.
    pub async fn start_or_resume_assessment(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<(Assessment, bool), DatabaseError> {
        if let Some(existing) = self.find_in_progress_assessment(user_id, template_id).await? {
            return Ok((existing, true));
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ASSESSMENT).await?;
        self.db()
            .execute_with(
                "INSERT INTO assessments (id, user_id, template_id, status, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                || {
                    libsql::params![
                        id.as_str(),
                        user_id,
                        template_id,
                        AssessmentStatus::InProgress.as_str(),
                        now.to_rfc3339()
                    ]
                },
            )
            .await?;
        tracing::info!(assessment_id = %id, template_id, "assessment started");

        Ok((
            Assessment {
                id,
                user_id: user_id.to_string(),
                template_id: template_id.to_string(),
                status: AssessmentStatus::InProgress,
                started_at: now,
                submitted_at: None,
                submitted_year: None,
            },
            false,
        ))
    }

    pub async fn find_in_progress_assessment(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Option<Assessment>, DatabaseError> {
        let sql = format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM assessments
             WHERE user_id = ?1 AND template_id = ?2 AND status = 'in_progress'
             LIMIT 1"
        );
        let mut rows = self.db().query_with(&sql, || [user_id, template_id]).await?;
        rows.next().await?.map(|row| row_to_assessment(&row)).transpose()
    }

    pub async fn get_assessment(&self, id: &str) -> Result<Assessment, DatabaseError> {
        let sql = format!("SELECT {ASSESSMENT_COLUMNS} FROM assessments WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_assessment(&row)
    }

    /// An assessment owned by `user_id`. Someone else's attempt reads as missing.
    pub async fn get_owned_assessment(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Assessment, DatabaseError> {
        let assessment = self.get_assessment(id).await?;
        if assessment.user_id != user_id {
            return Err(DatabaseError::NoResult);
        }
        Ok(assessment)
    }

    /// The user's most recently submitted attempt of a template.
    pub async fn latest_submitted_assessment(
        &self,
        user_id: &str,
        template_id: &str,
    ) -> Result<Option<Assessment>, DatabaseError> {
        let sql = format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM assessments
             WHERE user_id = ?1 AND template_id = ?2 AND status = 'submitted'
             ORDER BY submitted_at DESC, rowid DESC
             LIMIT 1"
        );
        let mut rows = self.db().query_with(&sql, || [user_id, template_id]).await?;
        rows.next().await?.map(|row| row_to_assessment(&row)).transpose()
    }

    /// Finalize an attempt, stamping `submitted_at` and `submitted_year`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the attempt does not exist or is not
    /// the user's, and `DatabaseError::InvalidState` if it is already submitted.
    pub async fn submit_assessment(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Assessment, DatabaseError> {
        let current = self.get_owned_assessment(id, user_id).await?;
        let next = AssessmentStatus::Submitted;

        if !current.status.can_transition_to(next) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition assessment {} from {} to {}",
                id, current.status, next
            )));
        }

        let now = Utc::now();
        let year = now.year();
        // The status guard makes a concurrent double submit a no-op.
        let changed = self
            .db()
            .execute_with(
                "UPDATE assessments SET status = ?1, submitted_at = ?2, submitted_year = ?3
                 WHERE id = ?4 AND status = 'in_progress'",
                || libsql::params![next.as_str(), now.to_rfc3339(), year, id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::InvalidState(format!(
                "Assessment {id} was submitted concurrently"
            )));
        }
        tracing::info!(assessment_id = id, submitted_year = year, "assessment submitted");

        Ok(Assessment {
            status: next,
            submitted_at: Some(now),
            submitted_year: Some(year),
            ..current
        })
    }

    /// Upsert one answer. `final_score` mirrors `points`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NoResult` if the attempt is not the user's or the question is not in its template
    /// - `DatabaseError::InvalidState` if the attempt is already submitted
    /// - `DatabaseError::Validation` if `points` is outside `[0, max_points]`
    pub async fn save_answer(
        &self,
        user_id: &str,
        answer: &SaveAnswer<'_>,
    ) -> Result<AssessmentSkillScore, DatabaseError> {
        let assessment = self.get_owned_assessment(answer.assessment_id, user_id).await?;
        if !assessment.status.accepts_answers() {
            return Err(DatabaseError::InvalidState(format!(
                "Assessment {} is {} and no longer accepts answers",
                assessment.id, assessment.status
            )));
        }

        let question = self
            .get_template_question(&assessment.template_id, answer.template_skill_id)
            .await?;
        if !answer.points.is_finite() || answer.points < 0.0 || answer.points > question.max_points {
            return Err(DatabaseError::Validation(format!(
                "points {} out of range [0, {}] for question {}",
                answer.points, question.max_points, question.id
            )));
        }

        let now = Utc::now().to_rfc3339();
        self.db()
            .execute_with(
                "INSERT INTO assessment_skill_scores
                    (assessment_id, template_skill_id, points, final_score, open_ended_response, updated_at)
                 VALUES (?1, ?2, ?3, ?3, ?4, ?5)
                 ON CONFLICT(assessment_id, template_skill_id) DO UPDATE SET
                    points = excluded.points,
                    final_score = excluded.final_score,
                    open_ended_response = excluded.open_ended_response,
                    updated_at = excluded.updated_at",
                || {
                    libsql::params![
                        answer.assessment_id,
                        answer.template_skill_id,
                        answer.points,
                        answer.open_ended_response,
                        now.as_str()
                    ]
                },
            )
            .await?;
        tracing::debug!(
            assessment_id = answer.assessment_id,
            template_skill_id = answer.template_skill_id,
            points = answer.points,
            "answer saved"
        );

        Ok(AssessmentSkillScore {
            assessment_id: answer.assessment_id.to_string(),
            template_skill_id: answer.template_skill_id.to_string(),
            points: answer.points,
            final_score: Some(answer.points),
            open_ended_response: answer.open_ended_response.map(String::from),
        })
    }

    pub async fn list_answers(
        &self,
        assessment_id: &str,
    ) -> Result<Vec<AssessmentSkillScore>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT assessment_id, template_skill_id, points, final_score, open_ended_response
                 FROM assessment_skill_scores WHERE assessment_id = ?1
                 ORDER BY rowid",
                || [assessment_id],
            )
            .await?;
        let mut answers = Vec::new();
        while let Some(row) = rows.next().await? {
            answers.push(row_to_answer(&row)?);
        }
        Ok(answers)
    }
}
