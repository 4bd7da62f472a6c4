//! Template repository: templates, skill groups, questions and response options.
//!
//! Questions live in `template_skills` and are shared between templates through
//! `meta_json.template_ids`. Membership queries go through `json_each`.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::json;

use sb_core::entities::{Question, ResponseOption, SkillGroup, Template};
use sb_core::ids::{PREFIX_RESPONSE_OPTION, PREFIX_SKILL_GROUP, PREFIX_TEMPLATE, PREFIX_TEMPLATE_SKILL};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, to_json_text};
use crate::service::SkillService;

/// `template_skills` rows linked to template `?1`.
pub(crate) const IN_TEMPLATE: &str = "EXISTS (SELECT 1 FROM json_each(ts.meta_json, '$.template_ids') je WHERE je.value = ?1)";

/// Input for a new question.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub skill_group_id: Option<String>,
    pub name: String,
    pub description: String,
    pub max_points: f64,
    pub order_index: i64,
    pub template_ids: Vec<String>,
}

/// Number of questions and total possible points for a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateScoreTotal {
    pub template_id: String,
    pub skill_count: i64,
    pub total_points: f64,
}

fn row_to_question(row: &libsql::Row) -> Result<Question, DatabaseError> {
    Ok(Question {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        description: get_opt_string(row, 2)?.unwrap_or_default(),
        skill_group_id: get_opt_string(row, 3)?,
        max_points: row.get::<f64>(4)?,
        order_index: row.get::<i64>(5)?,
        options: Vec::new(),
    })
}

fn row_to_option(row: &libsql::Row) -> Result<ResponseOption, DatabaseError> {
    Ok(ResponseOption {
        id: row.get::<String>(0)?,
        template_skill_id: row.get::<String>(1)?,
        response_text: row.get::<String>(2)?,
        point_value: row.get::<f64>(3)?,
        display_order: row.get::<i64>(4)?,
    })
}

impl SkillService {
    pub async fn create_template(&self, title: &str) -> Result<Template, DatabaseError> {
        let id = self.db().generate_id(PREFIX_TEMPLATE).await?;
        self.db()
            .execute_with("INSERT INTO templates (id, title) VALUES (?1, ?2)", || {
                [id.as_str(), title]
            })
            .await?;
        Ok(Template {
            id,
            title: title.to_string(),
        })
    }

    pub async fn get_template(&self, id: &str) -> Result<Template, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT id, title FROM templates WHERE id = ?1", || [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(Template {
            id: row.get(0)?,
            title: row.get(1)?,
        })
    }

    /// All templates, ordered by title.
    pub async fn list_templates(&self) -> Result<Vec<Template>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT id, title FROM templates ORDER BY title", || ())
            .await?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next().await? {
            templates.push(Template {
                id: row.get(0)?,
                title: row.get(1)?,
            });
        }
        Ok(templates)
    }

    pub async fn create_skill_group(
        &self,
        template_id: &str,
        name: &str,
    ) -> Result<SkillGroup, DatabaseError> {
        let id = self.db().generate_id(PREFIX_SKILL_GROUP).await?;
        self.db()
            .execute_with(
                "INSERT INTO skill_groups (id, template_id, name) VALUES (?1, ?2, ?3)",
                || [id.as_str(), template_id, name],
            )
            .await?;
        Ok(SkillGroup {
            id,
            template_id: template_id.to_string(),
            name: name.to_string(),
        })
    }

    /// Skill groups of a template, in creation order.
    pub async fn list_skill_groups(&self, template_id: &str) -> Result<Vec<SkillGroup>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id, template_id, name FROM skill_groups WHERE template_id = ?1 ORDER BY rowid",
                || [template_id],
            )
            .await?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next().await? {
            groups.push(SkillGroup {
                id: row.get(0)?,
                template_id: row.get(1)?,
                name: row.get(2)?,
            });
        }
        Ok(groups)
    }

    pub async fn create_question(&self, new: &NewQuestion) -> Result<Question, DatabaseError> {
        if !new.max_points.is_finite() || new.max_points < 0.0 {
            return Err(DatabaseError::Validation(format!(
                "max_points must be a non-negative number, got {}",
                new.max_points
            )));
        }
        let id = self.db().generate_id(PREFIX_TEMPLATE_SKILL).await?;
        let meta = to_json_text(&json!({
            "template_ids": new.template_ids,
            "description": new.description,
        }))?;

        self.db()
            .execute_with(
                "INSERT INTO template_skills (id, skill_group_id, name, max_points, order_index, meta_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                || {
                    libsql::params![
                        id.as_str(),
                        new.skill_group_id.as_deref(),
                        new.name.as_str(),
                        new.max_points,
                        new.order_index,
                        meta.as_str()
                    ]
                },
            )
            .await?;

        Ok(Question {
            id,
            name: new.name.clone(),
            description: new.description.clone(),
            skill_group_id: new.skill_group_id.clone(),
            max_points: new.max_points,
            order_index: new.order_index,
            options: Vec::new(),
        })
    }

    pub async fn create_response_option(
        &self,
        template_skill_id: &str,
        response_text: &str,
        point_value: f64,
        display_order: i64,
    ) -> Result<ResponseOption, DatabaseError> {
        let id = self.db().generate_id(PREFIX_RESPONSE_OPTION).await?;
        self.db()
            .execute_with(
                "INSERT INTO response_options (id, template_skill_id, response_text, point_value, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                || libsql::params![id.as_str(), template_skill_id, response_text, point_value, display_order],
            )
            .await?;
        Ok(ResponseOption {
            id,
            template_skill_id: template_skill_id.to_string(),
            response_text: response_text.to_string(),
            point_value,
            display_order,
        })
    }

    /// A question linked to template `template_id`, without options.
    pub async fn get_template_question(
        &self,
        template_id: &str,
        id: &str,
    ) -> Result<Question, DatabaseError> {
        let sql = format!(
            "SELECT ts.id, ts.name, json_extract(ts.meta_json, '$.description'), ts.skill_group_id,
                    ts.max_points, ts.order_index
             FROM template_skills ts
             WHERE {IN_TEMPLATE} AND ts.id = ?2"
        );
        let mut rows = self.db().query_with(&sql, || [template_id, id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_question(&row)
    }

    /// Questions linked to a template, ordered by `order_index`, each with its
    /// options ordered by `display_order`.
    pub async fn list_questions(&self, template_id: &str) -> Result<Vec<Question>, DatabaseError> {
        let sql = format!(
            "SELECT ts.id, ts.name, json_extract(ts.meta_json, '$.description'), ts.skill_group_id,
                    ts.max_points, ts.order_index
             FROM template_skills ts
             WHERE {IN_TEMPLATE}
             ORDER BY ts.order_index, ts.id"
        );
        let mut rows = self.db().query_with(&sql, || [template_id]).await?;
        let mut questions = Vec::new();
        while let Some(row) = rows.next().await? {
            questions.push(row_to_question(&row)?);
        }

        let sql = format!(
            "SELECT ro.id, ro.template_skill_id, ro.response_text, ro.point_value, ro.display_order
             FROM response_options ro
             JOIN template_skills ts ON ts.id = ro.template_skill_id
             WHERE {IN_TEMPLATE}
             ORDER BY ro.display_order, ro.id"
        );
        let mut rows = self.db().query_with(&sql, || [template_id]).await?;
        let mut options: HashMap<String, Vec<ResponseOption>> = HashMap::new();
        while let Some(row) = rows.next().await? {
            let option = row_to_option(&row)?;
            options
                .entry(option.template_skill_id.clone())
                .or_default()
                .push(option);
        }

        for question in &mut questions {
            question.options = options.remove(&question.id).unwrap_or_default();
        }
        Ok(questions)
    }

    /// Question count and summed `max_points` across a template.
    pub async fn template_score_total(
        &self,
        template_id: &str,
    ) -> Result<TemplateScoreTotal, DatabaseError> {
        let sql = format!(
            "SELECT COUNT(*), COALESCE(SUM(ts.max_points), 0.0)
             FROM template_skills ts WHERE {IN_TEMPLATE}"
        );
        let mut rows = self.db().query_with(&sql, || [template_id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(TemplateScoreTotal {
            template_id: template_id.to_string(),
            skill_count: row.get::<i64>(0)?,
            total_points: row.get::<f64>(1)?,
        })
    }

    pub async fn count_questions(&self, template_id: &str) -> Result<i64, DatabaseError> {
        Ok(self.template_score_total(template_id).await?.skill_count)
    }

    pub async fn count_skill_groups(&self, template_id: &str) -> Result<i64, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT COUNT(*) FROM skill_groups WHERE template_id = ?1",
                || [template_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }
}
