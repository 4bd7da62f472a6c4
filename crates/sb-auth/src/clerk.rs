//! Clerk Backend API client.
//!
//! Calls the Backend API directly via `reqwest` (clerk-rs doesn't expose the
//! organization membership endpoints we need). The base URL comes from
//! `clerk.api_url` so tests can point it at a mock server.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use sb_config::ClerkConfig;

use crate::AuthError;

/// A user's membership in a Clerk organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClerkOrgMembership {
    pub org_id: String,
    pub org_slug: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClerkOrganization {
    pub id: String,
    pub slug: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClerkUser {
    pub id: String,
}

/// A member of a Clerk organization, as listed from the organization side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClerkOrgMember {
    pub user_id: String,
    pub role: String,
}

/// Fields for creating a passwordless Clerk user.
#[derive(Debug, Clone, Default)]
pub struct NewClerkUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub public_metadata: Value,
}

impl NewClerkUser {
    /// Split a full name at the first space into first and last name.
    #[must_use]
    pub fn from_full_name(email: &str, full_name: &str, public_metadata: Value) -> Self {
        let trimmed = full_name.trim();
        let (first, last) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        Self {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.trim().to_string(),
            public_metadata,
        }
    }
}

#[derive(Deserialize)]
struct Paged<T> {
    data: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct ClerkClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl ClerkClient {
    #[must_use]
    pub fn new(base_url: &str, secret_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` when no secret key is set.
    pub fn from_config(config: &ClerkConfig) -> Result<Self, AuthError> {
        if !config.is_configured() {
            return Err(AuthError::NotConfigured("clerk.secret_key"));
        }
        Ok(Self::new(&config.api_url, &config.secret_key))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        what: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AuthError> {
        let resp = request
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AuthError::ClerkApiError(format!("{what}: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::ClerkApiError(format!("{what}: HTTP {status}: {body}")));
        }

        resp.json()
            .await
            .map_err(|e| AuthError::ClerkApiError(format!("parse {what}: {e}")))
    }

    /// Organizations the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn list_user_org_memberships(
        &self,
        user_id: &str,
    ) -> Result<Vec<ClerkOrgMembership>, AuthError> {
        #[derive(Deserialize)]
        struct Record {
            role: String,
            organization: Org,
        }
        #[derive(Deserialize)]
        struct Org {
            id: String,
            slug: String,
        }

        let url = self.url(&format!(
            "/users/{}/organization_memberships?limit=100",
            urlencoding::encode(user_id)
        ));
        let page: Paged<Record> = self.send("list user memberships", self.http.get(url)).await?;
        Ok(page
            .data
            .into_iter()
            .map(|r| ClerkOrgMembership {
                org_id: r.organization.id,
                org_slug: r.organization.slug,
                role: r.role,
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn list_organizations(&self) -> Result<Vec<ClerkOrganization>, AuthError> {
        let url = self.url("/organizations?limit=100");
        let page: Paged<ClerkOrganization> =
            self.send("list organizations", self.http.get(url)).await?;
        Ok(page.data)
    }

    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn find_organization_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ClerkOrganization>, AuthError> {
        Ok(self
            .list_organizations()
            .await?
            .into_iter()
            .find(|org| org.slug == slug))
    }

    /// Users whose email address matches exactly.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn find_users_by_email(&self, email: &str) -> Result<Vec<ClerkUser>, AuthError> {
        let url = self.url(&format!("/users?email_address={}", urlencoding::encode(email)));
        self.send("find users", self.http.get(url)).await
    }

    /// Create a user that signs in without a password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn create_user(&self, user: &NewClerkUser) -> Result<ClerkUser, AuthError> {
        let body = json!({
            "email_address": [user.email],
            "first_name": user.first_name,
            "last_name": user.last_name,
            "public_metadata": user.public_metadata,
            "skip_password_requirement": true,
            "skip_password_checks": true,
        });
        let created: ClerkUser = self
            .send("create user", self.http.post(self.url("/users")).json(&body))
            .await?;
        tracing::info!(clerk_user_id = %created.id, "clerk user created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn list_org_members(&self, org_id: &str) -> Result<Vec<ClerkOrgMember>, AuthError> {
        #[derive(Deserialize)]
        struct Record {
            role: String,
            public_user_data: Option<PublicUserData>,
        }
        #[derive(Deserialize)]
        struct PublicUserData {
            user_id: String,
        }

        let url = self.url(&format!(
            "/organizations/{}/memberships?limit=100",
            urlencoding::encode(org_id)
        ));
        let page: Paged<Record> = self.send("list org members", self.http.get(url)).await?;
        Ok(page
            .data
            .into_iter()
            .filter_map(|r| {
                let pud = r.public_user_data?;
                Some(ClerkOrgMember {
                    user_id: pud.user_id,
                    role: r.role,
                })
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn create_org_membership(
        &self,
        org_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<(), AuthError> {
        let url = self.url(&format!("/organizations/{}/memberships", urlencoding::encode(org_id)));
        let _: Value = self
            .send(
                "create org membership",
                self.http.post(url).json(&json!({ "user_id": user_id, "role": role })),
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn update_org_membership(
        &self,
        org_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<(), AuthError> {
        let url = self.url(&format!(
            "/organizations/{}/memberships/{}",
            urlencoding::encode(org_id),
            urlencoding::encode(user_id)
        ));
        let _: Value = self
            .send(
                "update org membership",
                self.http.patch(url).json(&json!({ "role": role })),
            )
            .await?;
        Ok(())
    }

    /// Give `user_id` the role in the organization, creating the membership if needed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if any API call fails.
    pub async fn ensure_org_membership(
        &self,
        org_id: &str,
        user_id: &str,
        role: &str,
    ) -> Result<(), AuthError> {
        let members = self.list_org_members(org_id).await?;
        if members.iter().any(|m| m.user_id == user_id) {
            self.update_org_membership(org_id, user_id, role).await
        } else {
            self.create_org_membership(org_id, user_id, role).await
        }
    }

    /// Replace the user's public metadata.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ClerkApiError` if the API call fails or returns non-2xx.
    pub async fn update_public_metadata(
        &self,
        user_id: &str,
        public_metadata: &Value,
    ) -> Result<(), AuthError> {
        let url = self.url(&format!("/users/{}/metadata", urlencoding::encode(user_id)));
        let _: Value = self
            .send(
                "update metadata",
                self.http
                    .patch(url)
                    .json(&json!({ "public_metadata": public_metadata })),
            )
            .await?;
        Ok(())
    }
}
