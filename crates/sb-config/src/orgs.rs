//! Organization assignment for newly created users.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrgsConfig {
    /// Organization that users join when nothing else assigns one.
    #[serde(default)]
    pub default_org_id: String,

    /// SSO provider identifier (first external account's `identification_id`)
    /// to organization ID.
    #[serde(default)]
    pub sso: BTreeMap<String, String>,
}

impl OrgsConfig {
    /// Organization for an SSO provider identifier, if one is mapped.
    pub fn org_for_sso(&self, provider: &str) -> Option<&str> {
        self.sso
            .get(&provider.to_lowercase())
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn default_org(&self) -> Option<&str> {
        Some(self.default_org_id.as_str()).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sso_lookup_is_case_insensitive() {
        let mut config = OrgsConfig::default();
        config.sso.insert("worldcc_sso".into(), "org-worldcc".into());
        assert_eq!(config.org_for_sso("WorldCC_SSO"), Some("org-worldcc"));
        assert_eq!(config.org_for_sso("ncma_sso"), None);
    }

    #[test]
    fn empty_default_is_none() {
        assert_eq!(OrgsConfig::default().default_org(), None);
    }
}
