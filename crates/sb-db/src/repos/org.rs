//! Organizations, corporations and their memberships.

use chrono::Utc;

use sb_core::entities::{CorpMembership, Corporation, OrgMembership, Organization};
use sb_core::enums::{CorpRole, UserRole};
use sb_core::ids::{PREFIX_CORPORATION, PREFIX_ORGANIZATION};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_enum};
use crate::service::SkillService;

fn row_to_org(row: &libsql::Row) -> Result<Organization, DatabaseError> {
    Ok(Organization {
        id: row.get::<String>(0)?,
        slug: row.get::<String>(1)?,
        name: get_opt_string(row, 2)?,
    })
}

fn row_to_corporation(row: &libsql::Row) -> Result<Corporation, DatabaseError> {
    Ok(Corporation {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        org_slug: row.get::<String>(2)?,
        org_id: get_opt_string(row, 3)?,
        external_id: get_opt_string(row, 4)?,
    })
}

fn row_to_corp_membership(row: &libsql::Row) -> Result<CorpMembership, DatabaseError> {
    Ok(CorpMembership {
        user_id: row.get::<String>(0)?,
        corporation_id: row.get::<String>(1)?,
        role: parse_enum(&row.get::<String>(2)?)?,
        external_id: get_opt_string(row, 3)?,
    })
}

impl SkillService {
    /// Insert an organization, or rename the existing one with the same slug.
    pub async fn upsert_organization(
        &self,
        slug: &str,
        name: Option<&str>,
    ) -> Result<Organization, DatabaseError> {
        let id = self.db().generate_id(PREFIX_ORGANIZATION).await?;
        self.db()
            .execute_with(
                "INSERT INTO organizations (id, slug, name) VALUES (?1, ?2, ?3)
                 ON CONFLICT(slug) DO UPDATE SET name = COALESCE(excluded.name, organizations.name)",
                || libsql::params![id.as_str(), slug, name],
            )
            .await?;
        self.find_org_by_slug(slug).await?.ok_or(DatabaseError::NoResult)
    }

    pub async fn find_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT id, slug, name FROM organizations WHERE slug = ?1", || [slug])
            .await?;
        rows.next().await?.map(|row| row_to_org(&row)).transpose()
    }

    pub async fn get_organization(&self, id: &str) -> Result<Organization, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT id, slug, name FROM organizations WHERE id = ?1", || [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_org(&row)
    }

    /// Create or update a user's membership in an organization.
    ///
    /// A `None` role leaves an existing role untouched.
    pub async fn upsert_org_membership(
        &self,
        user_id: &str,
        org_id: &str,
        role: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        self.db()
            .execute_with(
                "INSERT INTO org_memberships (user_id, org_id, role, created_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, org_id) DO UPDATE SET role = COALESCE(excluded.role, org_memberships.role)",
                || libsql::params![user_id, org_id, role, now.as_str()],
            )
            .await?;
        Ok(())
    }

    pub async fn list_org_memberships(&self, user_id: &str) -> Result<Vec<OrgMembership>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT user_id, org_id, role FROM org_memberships WHERE user_id = ?1 ORDER BY created_at, rowid",
                || [user_id],
            )
            .await?;
        let mut memberships = Vec::new();
        while let Some(row) = rows.next().await? {
            memberships.push(OrgMembership {
                user_id: row.get(0)?,
                org_id: row.get(1)?,
                role: get_opt_string(&row, 2)?,
            });
        }
        Ok(memberships)
    }

    /// Application role from the user's first organization membership.
    pub async fn get_user_role(&self, user_id: &str) -> Result<UserRole, DatabaseError> {
        let memberships = self.list_org_memberships(user_id).await?;
        let role = memberships.first().and_then(|m| m.role.as_deref());
        Ok(UserRole::from_membership(role))
    }

    /// Create a corporation under an organization slug.
    ///
    /// `org_id` is filled in when an organization with that slug exists.
    pub async fn create_corporation(
        &self,
        name: &str,
        org_slug: &str,
        external_id: Option<&str>,
    ) -> Result<Corporation, DatabaseError> {
        let id = self.db().generate_id(PREFIX_CORPORATION).await?;
        self.db()
            .execute_with(
                "INSERT INTO corporations (id, name, org_slug, org_id, external_id)
                 VALUES (?1, ?2, ?3, (SELECT id FROM organizations WHERE slug = ?3), ?4)",
                || libsql::params![id.as_str(), name, org_slug, external_id],
            )
            .await?;
        tracing::info!(corporation_id = %id, org_slug, "corporation created");
        self.get_corporation(&id).await
    }

    pub async fn get_corporation(&self, id: &str) -> Result<Corporation, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT id, name, org_slug, org_id, external_id FROM corporations WHERE id = ?1",
                || [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_corporation(&row)
    }

    /// Create or update a corporation membership, overwriting the role.
    pub async fn upsert_corp_membership(
        &self,
        user_id: &str,
        corporation_id: &str,
        role: CorpRole,
        external_id: Option<&str>,
    ) -> Result<CorpMembership, DatabaseError> {
        self.db()
            .execute_with(
                "INSERT INTO corp_memberships (user_id, corporation_id, role, external_id) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, corporation_id) DO UPDATE SET
                    role = excluded.role,
                    external_id = COALESCE(excluded.external_id, corp_memberships.external_id)",
                || libsql::params![user_id, corporation_id, role.as_str(), external_id],
            )
            .await?;
        self.get_corp_membership(user_id, corporation_id).await
    }

    /// Insert a corporation membership; fails if one already exists.
    pub async fn insert_corp_membership(
        &self,
        user_id: &str,
        corporation_id: &str,
        role: CorpRole,
        external_id: Option<&str>,
    ) -> Result<CorpMembership, DatabaseError> {
        self.db()
            .execute_with(
                "INSERT INTO corp_memberships (user_id, corporation_id, role, external_id) VALUES (?1, ?2, ?3, ?4)",
                || libsql::params![user_id, corporation_id, role.as_str(), external_id],
            )
            .await?;
        Ok(CorpMembership {
            user_id: user_id.to_string(),
            corporation_id: corporation_id.to_string(),
            role,
            external_id: external_id.map(String::from),
        })
    }

    pub async fn get_corp_membership(
        &self,
        user_id: &str,
        corporation_id: &str,
    ) -> Result<CorpMembership, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT user_id, corporation_id, role, external_id FROM corp_memberships
                 WHERE user_id = ?1 AND corporation_id = ?2",
                || [user_id, corporation_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_corp_membership(&row)
    }

    /// Membership with the given external ID and role, if any.
    pub async fn find_corp_membership_by_external_id(
        &self,
        external_id: &str,
        role: CorpRole,
    ) -> Result<Option<CorpMembership>, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(
                "SELECT user_id, corporation_id, role, external_id FROM corp_memberships
                 WHERE external_id = ?1 AND role = ?2 LIMIT 1",
                || [external_id, role.as_str()],
            )
            .await?;
        rows.next().await?.map(|row| row_to_corp_membership(&row)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use sb_core::enums::{CorpRole, UserRole};

    use crate::test_support::{test_profile, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn organization_upsert_keeps_id() {
        let svc = test_service().await;
        let first = svc.upsert_organization("acme", Some("Acme")).await.unwrap();
        let second = svc.upsert_organization("acme", None).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.name.as_deref(), Some("Acme"));
        assert!(svc.find_org_by_slug("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn role_comes_from_first_membership() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;
        assert_eq!(svc.get_user_role(&profile.id).await.unwrap(), UserRole::User);

        let org = svc.upsert_organization("acme", None).await.unwrap();
        svc.upsert_org_membership(&profile.id, &org.id, Some("corp_admin"))
            .await
            .unwrap();
        // A role-less resync must not wipe the role.
        svc.upsert_org_membership(&profile.id, &org.id, None).await.unwrap();

        assert_eq!(svc.get_user_role(&profile.id).await.unwrap(), UserRole::CorpAdmin);
    }

    #[tokio::test]
    async fn corporation_links_org_by_slug() {
        let svc = test_service().await;
        let org = svc.upsert_organization("acme", None).await.unwrap();

        let corp = svc.create_corporation("Acme Mining", "acme", None).await.unwrap();
        assert_eq!(corp.org_id.as_deref(), Some(org.id.as_str()));

        let orphan = svc.create_corporation("Loose Ltd", "unknown", None).await.unwrap();
        assert_eq!(orphan.org_id, None);
    }

    #[tokio::test]
    async fn corp_membership_lookup_by_external_id() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;
        let corp = svc.create_corporation("Acme", "acme", None).await.unwrap();

        svc.insert_corp_membership(&profile.id, &corp.id, CorpRole::CorpAdmin, Some("EXT-ADMIN"))
            .await
            .unwrap();
        assert!(
            svc.insert_corp_membership(&profile.id, &corp.id, CorpRole::Member, None)
                .await
                .is_err()
        );

        let found = svc
            .find_corp_membership_by_external_id("EXT-ADMIN", CorpRole::CorpAdmin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.user_id, profile.id);
        assert!(
            svc.find_corp_membership_by_external_id("EXT-ADMIN", CorpRole::Member)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn corp_membership_upsert_overwrites_role() {
        let svc = test_service().await;
        let profile = test_profile(&svc, "user_1").await;
        let corp = svc.create_corporation("Acme", "acme", None).await.unwrap();

        svc.upsert_corp_membership(&profile.id, &corp.id, CorpRole::Member, Some("EXT-1"))
            .await
            .unwrap();
        let updated = svc
            .upsert_corp_membership(&profile.id, &corp.id, CorpRole::CorpAdmin, None)
            .await
            .unwrap();
        assert_eq!(updated.role, CorpRole::CorpAdmin);
        assert_eq!(updated.external_id.as_deref(), Some("EXT-1"));
    }
}
