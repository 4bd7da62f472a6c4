//! Cohort repository: cohorts, their members, and payment state.

use chrono::Utc;

use sb_core::entities::{Cohort, CohortMember};
use sb_core::enums::PaymentStatus;
use sb_core::ids::PREFIX_COHORT;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_datetime};
use crate::service::SkillService;

const COHORT_COLUMNS: &str = "id, name, template_id, admin_id, corporation_id, external_id, payment_status, payment_received_at";

/// Input for a new cohort.
#[derive(Debug, Clone, Default)]
pub struct NewCohort {
    pub name: String,
    pub template_id: Option<String>,
    pub admin_id: Option<String>,
    pub corporation_id: Option<String>,
    pub external_id: Option<String>,
}

fn row_to_cohort(row: &libsql::Row) -> Result<Cohort, DatabaseError> {
    Ok(Cohort {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        template_id: get_opt_string(row, 2)?,
        admin_id: get_opt_string(row, 3)?,
        corporation_id: get_opt_string(row, 4)?,
        external_id: get_opt_string(row, 5)?,
        payment_status: parse_enum(&row.get::<String>(6)?)?,
        payment_received_at: parse_optional_datetime(get_opt_string(row, 7)?.as_deref())?,
    })
}

fn row_to_member(row: &libsql::Row) -> Result<CohortMember, DatabaseError> {
    Ok(CohortMember {
        cohort_id: row.get::<String>(0)?,
        user_id: row.get::<String>(1)?,
        status: row.get::<String>(2)?,
        added_at: parse_datetime(&row.get::<String>(3)?)?,
        added_by: get_opt_string(row, 4)?,
        cohort_group: get_opt_string(row, 5)?,
    })
}

impl SkillService {
    pub async fn create_cohort(&self, new: &NewCohort) -> Result<Cohort, DatabaseError> {
        let id = self.db().generate_id(PREFIX_COHORT).await?;
        self.db()
            .execute_with(
                "INSERT INTO cohorts (id, name, template_id, admin_id, corporation_id, external_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                || {
                    libsql::params![
                        id.as_str(),
                        new.name.as_str(),
                        new.template_id.as_deref(),
                        new.admin_id.as_deref(),
                        new.corporation_id.as_deref(),
                        new.external_id.as_deref()
                    ]
                },
            )
            .await?;
        self.get_cohort(&id).await
    }

    pub async fn get_cohort(&self, id: &str) -> Result<Cohort, DatabaseError> {
        let sql = format!("SELECT {COHORT_COLUMNS} FROM cohorts WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_cohort(&row)
    }

    pub async fn find_cohort_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Cohort>, DatabaseError> {
        let sql = format!("SELECT {COHORT_COLUMNS} FROM cohorts WHERE external_id = ?1");
        let mut rows = self.db().query_with(&sql, || [external_id]).await?;
        rows.next().await?.map(|row| row_to_cohort(&row)).transpose()
    }

    /// Record payment for a cohort, stamping the time it was received.
    pub async fn mark_cohort_paid(&self, id: &str) -> Result<Cohort, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let changed = self
            .db()
            .execute_with(
                "UPDATE cohorts SET payment_status = ?1, payment_received_at = ?2 WHERE id = ?3",
                || [PaymentStatus::Paid.as_str(), now.as_str(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        tracing::info!(cohort_id = id, "cohort marked paid");
        self.get_cohort(id).await
    }

    /// Add a user to a cohort as an active member. Re-adding is a no-op.
    pub async fn add_cohort_member(
        &self,
        cohort_id: &str,
        user_id: &str,
        added_by: Option<&str>,
        cohort_group: Option<&str>,
    ) -> Result<CohortMember, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.db()
            .execute_with(
                "INSERT INTO cohort_members (cohort_id, user_id, status, added_at, added_by, cohort_group)
                 VALUES (?1, ?2, 'active', ?3, ?4, ?5)
                 ON CONFLICT(cohort_id, user_id) DO NOTHING",
                || libsql::params![cohort_id, user_id, now.as_str(), added_by, cohort_group],
            )
            .await?;

        let mut rows = self
            .db()
            .query_with(
                "SELECT cohort_id, user_id, status, added_at, added_by, cohort_group
                 FROM cohort_members WHERE cohort_id = ?1 AND user_id = ?2",
                || [cohort_id, user_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_member(&row)
    }

    pub async fn list_cohort_members(&self, cohort_id: &str) -> Result<Vec<CohortMember>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT cohort_id, user_id, status, added_at, added_by, cohort_group
                 FROM cohort_members WHERE cohort_id = ?1 ORDER BY added_at, rowid",
                || [cohort_id],
            )
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_member(&row)?);
        }
        Ok(members)
    }

    /// Template the user should take: the template of their earliest cohort
    /// membership, else `default_template_id`.
    pub async fn resolve_template_for_user(
        &self,
        user_id: &str,
        default_template_id: Option<&str>,
    ) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT c.template_id FROM cohort_members m
                 JOIN cohorts c ON c.id = m.cohort_id
                 WHERE m.user_id = ?1
                 ORDER BY m.added_at, m.rowid
                 LIMIT 1",
                || [user_id],
            )
            .await?;
        let from_cohort = match rows.next().await? {
            Some(row) => get_opt_string(&row, 0)?,
            None => None,
        };
        Ok(from_cohort.or_else(|| default_template_id.map(String::from)))
    }
}

#[cfg(test)]
mod tests {
    use super::NewCohort;
    use sb_core::enums::PaymentStatus;

    use crate::error::DatabaseError;
    use crate::test_support::{seed_template, test_profile, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn template_resolves_from_cohort_else_default() {
        let svc = test_service().await;
        let seeded = seed_template(&svc).await;
        let profile = test_profile(&svc, "user_1").await;

        let resolved = svc
            .resolve_template_for_user(&profile.id, Some("tpl-default"))
            .await
            .unwrap();
        assert_eq!(resolved.as_deref(), Some("tpl-default"));
        assert_eq!(svc.resolve_template_for_user(&profile.id, None).await.unwrap(), None);

        let cohort = svc
            .create_cohort(&NewCohort {
                name: "Spring".into(),
                template_id: Some(seeded.template.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        svc.add_cohort_member(&cohort.id, &profile.id, None, None)
            .await
            .unwrap();

        let resolved = svc
            .resolve_template_for_user(&profile.id, Some("tpl-default"))
            .await
            .unwrap();
        assert_eq!(resolved, Some(seeded.template.id));
    }

    #[tokio::test]
    async fn adding_member_twice_keeps_first_row() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;
        let cohort = svc
            .create_cohort(&NewCohort {
                name: "Spring".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        let first = svc
            .add_cohort_member(&cohort.id, &profile.id, Some("admin"), Some("A"))
            .await
            .unwrap();
        let second = svc
            .add_cohort_member(&cohort.id, &profile.id, None, Some("B"))
            .await
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(first.status, "active");
        assert_eq!(svc.list_cohort_members(&cohort.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn payment_marks_cohort_paid() {
        let svc = test_service().await;
        let cohort = svc
            .create_cohort(&NewCohort {
                name: "Paid".into(),
                external_id: Some("EXT-9".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(cohort.payment_status, PaymentStatus::Pending);

        let found = svc.find_cohort_by_external_id("EXT-9").await.unwrap().unwrap();
        let paid = svc.mark_cohort_paid(&found.id).await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
        assert!(paid.payment_received_at.is_some());

        assert!(matches!(
            svc.mark_cohort_paid("coh-missing").await,
            Err(DatabaseError::NoResult)
        ));
    }
}
