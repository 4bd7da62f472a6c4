//! Lookup tables behind the benchmark filter dropdowns.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::DatabaseError;
use crate::helpers::get_opt_string;
use crate::service::SkillService;

/// A `(key, label, order_index)` lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTable {
    JobRoles,
    FunctionalAreas,
    Industries,
    EducationLevels,
    YearsExperience,
    SeniorityLevels,
}

impl LookupTable {
    pub const ALL: [Self; 6] = [
        Self::JobRoles,
        Self::FunctionalAreas,
        Self::Industries,
        Self::EducationLevels,
        Self::YearsExperience,
        Self::SeniorityLevels,
    ];

    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::JobRoles => "job_roles",
            Self::FunctionalAreas => "functional_areas",
            Self::Industries => "industries",
            Self::EducationLevels => "education_levels",
            Self::YearsExperience => "years_experience",
            Self::SeniorityLevels => "seniority_levels",
        }
    }
}

/// Values offered for each benchmark filter, keyed like the benchmark query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub role: Vec<String>,
    pub functional_area: Vec<String>,
    pub industry: Vec<String>,
    pub education_level: Vec<String>,
    pub years_experience: Vec<String>,
    pub job_level: Vec<String>,
    pub country: Vec<String>,
    pub region: Vec<String>,
    pub sub_region: Vec<String>,
}

impl SkillService {
    pub async fn insert_lookup(
        &self,
        table: LookupTable,
        key: &str,
        label: &str,
        order_index: i64,
    ) -> Result<(), DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (key, label, order_index) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET label = excluded.label, order_index = excluded.order_index",
            table.table()
        );
        self.db()
            .execute_with(&sql, || libsql::params![key, label, order_index])
            .await?;
        Ok(())
    }

    pub async fn insert_country(
        &self,
        country_name: &str,
        region: &str,
        sub_region: Option<&str>,
    ) -> Result<(), DatabaseError> {
        self.db()
            .execute_with(
                "INSERT INTO countries (country_name, region, sub_region) VALUES (?1, ?2, ?3)
                 ON CONFLICT(country_name) DO UPDATE SET region = excluded.region, sub_region = excluded.sub_region",
                || libsql::params![country_name, region, sub_region],
            )
            .await?;
        Ok(())
    }

    /// Labels of one lookup table, ordered by `order_index`.
    pub async fn lookup_labels(&self, table: LookupTable) -> Result<Vec<String>, DatabaseError> {
        let sql = format!(
            "SELECT label FROM {} ORDER BY order_index, label",
            table.table()
        );
        let mut rows = self.db().query_with(&sql, || ()).await?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next().await? {
            labels.push(row.get::<String>(0)?);
        }
        Ok(labels)
    }

    /// Every filter's options, with regions and sub-regions derived from countries.
    pub async fn filter_options(&self) -> Result<FilterOptions, DatabaseError> {
        let mut options = FilterOptions::default();
        for table in LookupTable::ALL {
            let labels = self.lookup_labels(table).await?;
            match table {
                LookupTable::JobRoles => options.role = labels,
                LookupTable::FunctionalAreas => options.functional_area = labels,
                LookupTable::Industries => options.industry = labels,
                LookupTable::EducationLevels => options.education_level = labels,
                LookupTable::YearsExperience => options.years_experience = labels,
                LookupTable::SeniorityLevels => options.job_level = labels,
            }
        }

        let mut rows = self
            .db()
            .query_with(
                "SELECT country_name, region, sub_region FROM countries ORDER BY country_name",
                || (),
            )
            .await?;
        let mut regions = BTreeSet::new();
        let mut sub_regions = BTreeSet::new();
        while let Some(row) = rows.next().await? {
            options.country.push(row.get::<String>(0)?);
            regions.insert(row.get::<String>(1)?);
            if let Some(sub) = get_opt_string(&row, 2)? {
                sub_regions.insert(sub);
            }
        }
        options.region = regions.into_iter().collect();
        options.sub_region = sub_regions.into_iter().collect();
        Ok(options)
    }
}
