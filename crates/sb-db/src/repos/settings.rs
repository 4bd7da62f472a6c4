//! Per-user benchmark dimensions and display settings.

use chrono::Utc;

use sb_core::entities::{UserDimensions, UserSettings};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_enum};
use crate::service::SkillService;

fn row_to_dimensions(row: &libsql::Row) -> Result<UserDimensions, DatabaseError> {
    Ok(UserDimensions {
        user_id: row.get::<String>(0)?,
        country: get_opt_string(row, 1)?,
        sub_region: get_opt_string(row, 2)?,
        job_role: get_opt_string(row, 3)?,
        industry: get_opt_string(row, 4)?,
        years_experience: row.get::<Option<i64>>(5)?,
        education_level: get_opt_string(row, 6)?,
        functional_area: get_opt_string(row, 7)?,
        seniority_level: get_opt_string(row, 8)?,
    })
}

fn row_to_settings(row: &libsql::Row) -> Result<UserSettings, DatabaseError> {
    Ok(UserSettings {
        summary_report_mode: parse_enum(&row.get::<String>(0)?)?,
        dashboard_option: parse_enum(&row.get::<String>(1)?)?,
        percentage_based_scoring: get_bool(row, 2)?,
        benchmark_default: parse_enum(&row.get::<String>(3)?)?,
    })
}

impl SkillService {
    pub async fn get_user_dimensions(
        &self,
        user_id: &str,
    ) -> Result<Option<UserDimensions>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT user_id, country, sub_region, job_role, industry, years_experience,
                        education_level, functional_area, seniority_level
                 FROM user_dimensions WHERE user_id = ?1",
                || [user_id],
            )
            .await?;
        rows.next().await?.map(|row| row_to_dimensions(&row)).transpose()
    }

    /// Replace every dimension for the user. Absent fields are stored as NULL.
    pub async fn upsert_user_dimensions(&self, dims: &UserDimensions) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.db()
            .execute_with(
                "INSERT INTO user_dimensions (user_id, country, sub_region, job_role, industry,
                    years_experience, education_level, functional_area, seniority_level, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(user_id) DO UPDATE SET
                    country = excluded.country,
                    sub_region = excluded.sub_region,
                    job_role = excluded.job_role,
                    industry = excluded.industry,
                    years_experience = excluded.years_experience,
                    education_level = excluded.education_level,
                    functional_area = excluded.functional_area,
                    seniority_level = excluded.seniority_level,
                    updated_at = excluded.updated_at",
                || {
                    libsql::params![
                        dims.user_id.as_str(),
                        dims.country.as_deref(),
                        dims.sub_region.as_deref(),
                        dims.job_role.as_deref(),
                        dims.industry.as_deref(),
                        dims.years_experience,
                        dims.education_level.as_deref(),
                        dims.functional_area.as_deref(),
                        dims.seniority_level.as_deref(),
                        now.as_str()
                    ]
                },
            )
            .await?;
        Ok(())
    }

    /// Stored settings, or the defaults when the user never saved any.
    pub async fn get_user_settings(&self, user_id: &str) -> Result<UserSettings, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT summary_report_mode, dashboard_option, percentage_based_scoring, benchmark_default
                 FROM user_settings WHERE user_id = ?1",
                || [user_id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => row_to_settings(&row),
            None => Ok(UserSettings::default()),
        }
    }

    pub async fn upsert_user_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<UserSettings, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.db()
            .execute_with(
                "INSERT INTO user_settings (user_id, summary_report_mode, dashboard_option,
                    percentage_based_scoring, benchmark_default, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id) DO UPDATE SET
                    summary_report_mode = excluded.summary_report_mode,
                    dashboard_option = excluded.dashboard_option,
                    percentage_based_scoring = excluded.percentage_based_scoring,
                    benchmark_default = excluded.benchmark_default,
                    updated_at = excluded.updated_at",
                || {
                    libsql::params![
                        user_id,
                        settings.summary_report_mode.as_str(),
                        settings.dashboard_option.as_str(),
                        i64::from(settings.percentage_based_scoring),
                        settings.benchmark_default.as_str(),
                        now.as_str()
                    ]
                },
            )
            .await?;
        self.get_user_settings(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use sb_core::entities::{UserDimensions, UserSettings};
    use sb_core::enums::{BenchmarkDefault, DashboardOption, SummaryReportMode};

    use crate::test_support::{test_profile, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn settings_default_when_absent() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;

        let settings = svc.get_user_settings(&profile.id).await.unwrap();
        assert_eq!(settings, UserSettings::default());
        assert!(settings.percentage_based_scoring);
        assert_eq!(settings.summary_report_mode, SummaryReportMode::SummaryReports);
    }

    #[tokio::test]
    async fn settings_upsert_roundtrip() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;

        let wanted = UserSettings {
            summary_report_mode: SummaryReportMode::AssessmentCompletion,
            dashboard_option: DashboardOption::Assessments,
            percentage_based_scoring: false,
            benchmark_default: BenchmarkDefault::Country,
        };
        svc.upsert_user_settings(&profile.id, &wanted).await.unwrap();
        let again = svc.upsert_user_settings(&profile.id, &wanted).await.unwrap();
        assert_eq!(again, wanted);
    }

    #[tokio::test]
    async fn dimensions_are_replaced_wholesale() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;
        assert!(svc.get_user_dimensions(&profile.id).await.unwrap().is_none());

        let dims = UserDimensions {
            user_id: profile.id.clone(),
            country: Some("Canada".into()),
            industry: Some("Energy".into()),
            years_experience: Some(7),
            ..Default::default()
        };
        svc.upsert_user_dimensions(&dims).await.unwrap();

        let narrower = UserDimensions {
            user_id: profile.id.clone(),
            country: Some("Canada".into()),
            ..Default::default()
        };
        svc.upsert_user_dimensions(&narrower).await.unwrap();

        let stored = svc.get_user_dimensions(&profile.id).await.unwrap().unwrap();
        assert_eq!(stored, narrower);
    }
}
