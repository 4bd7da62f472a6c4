//! # sb-db
//!
//! libSQL storage for skillbench.
//!
//! Holds every relational record: profiles and their benchmark dimensions,
//! templates with their skill groups, questions and response options,
//! assessment attempts and answers, organizations, corporations, cohorts,
//! learning paths and the integration sync log. Benchmarks are computed from
//! the same tables with filtered SQL, then summarized by `sb-core`.
//!
//! The database is a local file, `:memory:`, or a remote Turso database.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;
pub mod service;

#[cfg(test)]
mod test_support;

use std::future::Future;

use libsql::Builder;
use libsql::params::IntoParams;
use sb_config::DatabaseConfig;

use error::DatabaseError;
use retry::{RetryConfig, is_transient_turso_error};

/// Central database handle.
///
/// Wraps a libSQL database and a single connection. Statements on remote
/// databases are retried on transient Turso errors.
pub struct SkillDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    remote: bool,
    retry: RetryConfig,
}

impl SkillDb {
    /// Open a local database file, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        Self::finish_open(db, false).await
    }

    /// Open a remote Turso database over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        Self::finish_open(db, true).await
    }

    /// Open whichever database the configuration points at.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        if config.is_remote() {
            tracing::info!(url = %config.url, "opening remote database");
            Self::open_remote(&config.url, &config.auth_token).await
        } else {
            tracing::info!(path = %config.local_path, "opening local database");
            Self::open_local(&config.local_path).await
        }
    }

    async fn finish_open(db: libsql::Database, remote: bool) -> Result<Self, DatabaseError> {
        let conn = db.connect()?;

        // Per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let skill_db = Self {
            db,
            conn,
            remote,
            retry: RetryConfig::default(),
        };
        skill_db.run_migrations().await?;
        Ok(skill_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"asm-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let sql = format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))");
        let mut rows = self.query_with(&sql, || ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }

    /// Execute a single statement.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails.
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, DatabaseError> {
        Ok(self.conn.execute(sql, params).await?)
    }

    /// Run a query and return its rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the query fails.
    pub async fn query(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<libsql::Rows, DatabaseError> {
        Ok(self.conn.query(sql, params).await?)
    }

    /// Execute a statement, retrying transient remote errors.
    ///
    /// Parameters are rebuilt by `params` for each attempt.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` once retries are exhausted or the error is not transient.
    pub async fn execute_with<F, P>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        self.with_retry(|| self.conn.execute(sql, params())).await
    }

    /// Run a query, retrying transient remote errors.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` once retries are exhausted or the error is not transient.
    pub async fn query_with<F, P>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        F: Fn() -> P,
        P: IntoParams,
    {
        self.with_retry(|| self.conn.query(sql, params())).await
    }

    async fn with_retry<T, Fut, Op>(&self, mut op: Op) -> Result<T, DatabaseError>
    where
        Op: FnMut() -> Fut,
        Fut: Future<Output = Result<T, libsql::Error>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e)
                    if self.remote
                        && attempt < self.retry.max_attempts
                        && is_transient_turso_error(&e) =>
                {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(attempt, ?delay, error = %e, "transient Turso error, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> SkillDb {
        SkillDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "profiles",
            "user_dimensions",
            "user_settings",
            "templates",
            "skill_groups",
            "template_skills",
            "response_options",
            "assessments",
            "assessment_skill_scores",
            "organizations",
            "org_memberships",
            "corporations",
            "corp_memberships",
            "cohorts",
            "cohort_members",
            "learning_paths",
            "learning_path_rules",
            "org_sync_log",
            "countries",
            "job_roles",
            "functional_areas",
            "industries",
            "education_levels",
            "years_experience",
            "seniority_levels",
        ];
        for table in &tables {
            let mut rows = db
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("asm").await.unwrap();
        assert!(id.starts_with("asm-"), "ID should start with 'asm-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in sb_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let db = test_db().await;
        let result = db
            .execute(
                "INSERT INTO skill_groups (id, template_id, name) VALUES ('sgp-1', 'tpl-missing', 'Orphan')",
                (),
            )
            .await;
        assert!(result.is_err(), "orphan skill group should violate FK");
    }

    #[tokio::test]
    async fn one_in_progress_attempt_per_template() {
        let db = test_db().await;
        db.execute_with(
            "INSERT INTO profiles (id, clerk_user_id) VALUES ('prf-1', 'user_1')",
            || (),
        )
        .await
        .unwrap();
        db.execute("INSERT INTO templates (id, title) VALUES ('tpl-1', 'Core')", ())
            .await
            .unwrap();

        let insert = "INSERT INTO assessments (id, user_id, template_id, status, started_at)
                      VALUES (?1, 'prf-1', 'tpl-1', 'in_progress', '2026-01-01T00:00:00+00:00')";
        db.execute(insert, ["asm-1"]).await.unwrap();
        assert!(db.execute(insert, ["asm-2"]).await.is_err());
    }
}
