//! Learning paths (mirrored from the CMS) and the score rules that select them.

use std::collections::HashMap;

use chrono::Utc;

use sb_core::entities::{LearningPath, LearningPathRule};
use sb_core::ids::{PREFIX_LEARNING_PATH, PREFIX_LEARNING_RULE};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_optional_json, to_json_text};
use crate::service::SkillService;

const PATH_COLUMNS: &str = "id, external_id, org_id, title, description, url, metadata";
const RULE_COLUMNS: &str = "id, org_id, template_id, skill_group_id, template_skill_id, min_score, max_score, learning_path_id, priority";

/// A learning path document as received from the CMS.
#[derive(Debug, Clone, Default)]
pub struct NewLearningPath {
    pub external_id: String,
    pub org_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// A rule document, with its path reference already resolved to a row ID.
#[derive(Debug, Clone, Default)]
pub struct NewLearningPathRule {
    pub org_id: Option<String>,
    pub template_id: Option<String>,
    pub skill_group_id: Option<String>,
    pub template_skill_id: Option<String>,
    pub min_score: f64,
    pub max_score: f64,
    pub learning_path_id: String,
    pub priority: i64,
}

fn row_to_path(row: &libsql::Row) -> Result<LearningPath, DatabaseError> {
    Ok(LearningPath {
        id: row.get::<String>(0)?,
        external_id: row.get::<String>(1)?,
        org_id: get_opt_string(row, 2)?,
        title: row.get::<String>(3)?,
        description: get_opt_string(row, 4)?,
        url: get_opt_string(row, 5)?,
        metadata: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
    })
}

fn row_to_rule(row: &libsql::Row) -> Result<LearningPathRule, DatabaseError> {
    Ok(LearningPathRule {
        id: row.get::<String>(0)?,
        org_id: get_opt_string(row, 1)?,
        template_id: get_opt_string(row, 2)?,
        skill_group_id: get_opt_string(row, 3)?,
        template_skill_id: get_opt_string(row, 4)?,
        min_score: row.get::<f64>(5)?,
        max_score: row.get::<f64>(6)?,
        learning_path_id: row.get::<String>(7)?,
        priority: row.get::<i64>(8)?,
    })
}

impl SkillService {
    /// Insert or update a learning path keyed by its CMS document ID.
    pub async fn upsert_learning_path(
        &self,
        new: &NewLearningPath,
    ) -> Result<LearningPath, DatabaseError> {
        let id = self.db().generate_id(PREFIX_LEARNING_PATH).await?;
        let metadata = new.metadata.as_ref().map(to_json_text).transpose()?;
        let now = Utc::now().to_rfc3339();

        self.db()
            .execute_with(
                "INSERT INTO learning_paths (id, external_id, org_id, title, description, url, metadata, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(external_id) DO UPDATE SET
                    org_id = excluded.org_id,
                    title = excluded.title,
                    description = excluded.description,
                    url = excluded.url,
                    metadata = excluded.metadata,
                    updated_at = excluded.updated_at",
                || {
                    libsql::params![
                        id.as_str(),
                        new.external_id.as_str(),
                        new.org_id.as_deref(),
                        new.title.as_str(),
                        new.description.as_deref(),
                        new.url.as_deref(),
                        metadata.as_deref(),
                        now.as_str()
                    ]
                },
            )
            .await?;

        let sql = format!("SELECT {PATH_COLUMNS} FROM learning_paths WHERE external_id = ?1");
        let mut rows = self
            .db()
            .query_with(&sql, || [new.external_id.as_str()])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_path(&row)
    }

    /// Row ID of the learning path mirrored from a CMS document.
    pub async fn resolve_learning_path_id(
        &self,
        external_id: &str,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id FROM learning_paths WHERE external_id = ?1",
                || [external_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if `min_score > max_score`.
    pub async fn insert_learning_path_rule(
        &self,
        new: &NewLearningPathRule,
    ) -> Result<LearningPathRule, DatabaseError> {
        if new.min_score > new.max_score {
            return Err(DatabaseError::Validation(format!(
                "min_score {} exceeds max_score {}",
                new.min_score, new.max_score
            )));
        }
        let id = self.db().generate_id(PREFIX_LEARNING_RULE).await?;
        self.db()
            .execute_with(
                "INSERT INTO learning_path_rules (id, org_id, template_id, skill_group_id, template_skill_id,
                    min_score, max_score, learning_path_id, priority)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                || {
                    libsql::params![
                        id.as_str(),
                        new.org_id.as_deref(),
                        new.template_id.as_deref(),
                        new.skill_group_id.as_deref(),
                        new.template_skill_id.as_deref(),
                        new.min_score,
                        new.max_score,
                        new.learning_path_id.as_str(),
                        new.priority
                    ]
                },
            )
            .await?;

        Ok(LearningPathRule {
            id,
            org_id: new.org_id.clone(),
            template_id: new.template_id.clone(),
            skill_group_id: new.skill_group_id.clone(),
            template_skill_id: new.template_skill_id.clone(),
            min_score: new.min_score,
            max_score: new.max_score,
            learning_path_id: new.learning_path_id.clone(),
            priority: new.priority,
        })
    }

    /// Rules whose org/template scope is unset or equal to the given one.
    pub async fn list_learning_path_rules(
        &self,
        org_id: Option<&str>,
        template_id: Option<&str>,
    ) -> Result<Vec<LearningPathRule>, DatabaseError> {
        let sql = format!(
            "SELECT {RULE_COLUMNS} FROM learning_path_rules
             WHERE (org_id IS NULL OR org_id = ?1)
               AND (template_id IS NULL OR template_id = ?2)
             ORDER BY priority DESC, rowid"
        );
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params![org_id, template_id])
            .await?;
        let mut rules = Vec::new();
        while let Some(row) = rows.next().await? {
            rules.push(row_to_rule(&row)?);
        }
        Ok(rules)
    }

    /// Learning paths by row ID, in the order given. Unknown IDs are skipped.
    pub async fn get_learning_paths(&self, ids: &[String]) -> Result<Vec<LearningPath>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT {PATH_COLUMNS} FROM learning_paths WHERE id IN ({})",
            placeholders.join(", ")
        );
        let params: Vec<libsql::Value> = ids.iter().map(|id| id.as_str().into()).collect();
        let mut rows = self
            .db()
            .query_with(&sql, || libsql::params_from_iter(params.clone()))
            .await?;

        let mut by_id = HashMap::new();
        while let Some(row) = rows.next().await? {
            let path = row_to_path(&row)?;
            by_id.insert(path.id.clone(), path);
        }
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
