//! Profile repository: one profile per Clerk user.

use chrono::Utc;

use sb_core::entities::Profile;
use sb_core::ids::PREFIX_PROFILE;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime};
use crate::service::SkillService;

const PROFILE_COLUMNS: &str = "id, clerk_user_id, full_name, email, created_at, updated_at";

fn row_to_profile(row: &libsql::Row) -> Result<Profile, DatabaseError> {
    Ok(Profile {
        id: row.get::<String>(0)?,
        clerk_user_id: row.get::<String>(1)?,
        full_name: get_opt_string(row, 2)?,
        email: get_opt_string(row, 3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl SkillService {
    /// Insert or refresh the profile for a Clerk user.
    ///
    /// Keyed by `clerk_user_id`; the profile ID is stable across updates.
    pub async fn upsert_profile(
        &self,
        clerk_user_id: &str,
        full_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Profile, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let id = self.db().generate_id(PREFIX_PROFILE).await?;

        self.db()
            .execute_with(
                "INSERT INTO profiles (id, clerk_user_id, full_name, email, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(clerk_user_id) DO UPDATE SET
                    full_name = excluded.full_name,
                    email = excluded.email,
                    updated_at = excluded.updated_at",
                || libsql::params![id.as_str(), clerk_user_id, full_name, email, now.as_str()],
            )
            .await?;

        tracing::debug!(clerk_user_id, "profile upserted");
        self.get_profile_by_clerk_id(clerk_user_id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no profile exists for the Clerk user.
    pub async fn get_profile_by_clerk_id(&self, clerk_user_id: &str) -> Result<Profile, DatabaseError> {
        self.find_profile_by_clerk_id(clerk_user_id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    pub async fn find_profile_by_clerk_id(
        &self,
        clerk_user_id: &str,
    ) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE clerk_user_id = ?1");
        let mut rows = self.db().query_with(&sql, || [clerk_user_id]).await?;
        rows.next().await?.map(|row| row_to_profile(&row)).transpose()
    }

    pub async fn get_profile(&self, id: &str) -> Result<Profile, DatabaseError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1");
        let mut rows = self.db().query_with(&sql, || [id]).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_profile(&row)
    }

    pub async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE lower(email) = lower(?1) ORDER BY created_at LIMIT 1"
        );
        let mut rows = self.db().query_with(&sql, || [email]).await?;
        rows.next().await?.map(|row| row_to_profile(&row)).transpose()
    }

    /// Set or clear the display name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the profile does not exist.
    pub async fn update_profile_name(
        &self,
        id: &str,
        full_name: Option<&str>,
    ) -> Result<Profile, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let changed = self
            .db()
            .execute_with(
                "UPDATE profiles SET full_name = ?1, updated_at = ?2 WHERE id = ?3",
                || libsql::params![full_name, now.as_str(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_profile(id).await
    }
}
