use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CorpRole;

/// A top-level tenant (e.g. a member association) mirrored from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: Option<String>,
}

/// A user's membership in an organization. `role` stays unset until assigned.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrgMembership {
    pub user_id: String,
    pub org_id: String,
    pub role: Option<String>,
}

/// A company provisioned under an organization by an external system.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Corporation {
    pub id: String,
    pub name: String,
    pub org_slug: String,
    pub org_id: Option<String>,
    pub external_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CorpMembership {
    pub user_id: String,
    pub corporation_id: String,
    pub role: CorpRole,
    pub external_id: Option<String>,
}
