//! Service layer over the database handle.
//!
//! `SkillService` wraps `SkillDb`. All repository methods are implemented as
//! `impl SkillService` blocks under `repos/`.

use sb_config::DatabaseConfig;

use crate::SkillDb;
use crate::error::DatabaseError;

pub struct SkillService {
    db: SkillDb,
}

impl SkillService {
    /// Create a service over a local database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(SkillDb::open_local(db_path).await?))
    }

    /// Create a service from storage configuration (remote Turso or local file).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(SkillDb::open(config).await?))
    }

    #[must_use]
    pub const fn from_db(db: SkillDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &SkillDb {
        &self.db
    }
}
