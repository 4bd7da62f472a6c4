//! Shared secrets for inbound integration webhooks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WebhookConfig {
    /// HMAC secret for the provisioning and payment webhooks.
    #[serde(default)]
    pub provision_secret: String,

    /// HMAC secret for Sanity document webhooks. Empty disables the check.
    #[serde(default)]
    pub sanity_secret: String,
}

impl WebhookConfig {
    pub fn has_provision_secret(&self) -> bool {
        !self.provision_secret.is_empty()
    }

    pub fn has_sanity_secret(&self) -> bool {
        !self.sanity_secret.is_empty()
    }
}
