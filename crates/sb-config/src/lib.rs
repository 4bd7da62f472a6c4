//! # sb-config
//!
//! Layered configuration loading for skillbench using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SKILLBENCH_*` prefix, `__` as separator)
//! 2. Project-level `.skillbench/config.toml`
//! 3. User-level `~/.config/skillbench/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SKILLBENCH_DATABASE__URL` -> `database.url`,
//! `SKILLBENCH_ORGS__SSO__WORLDCC_SSO` -> `orgs.sso.worldcc_sso`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sb_config::SkillbenchConfig;
//!
//! let config = SkillbenchConfig::load_with_dotenv().expect("config");
//! if config.database.is_remote() {
//!     println!("Turso URL: {}", config.database.url);
//! }
//! ```

mod assessment;
mod clerk;
mod database;
mod error;
mod orgs;
mod server;
mod webhooks;

pub use assessment::AssessmentConfig;
pub use clerk::ClerkConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use orgs::OrgsConfig;
pub use server::ServerConfig;
pub use webhooks::WebhookConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const REDACTED: &str = "********";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SkillbenchConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub clerk: ClerkConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub webhooks: WebhookConfig,
    #[serde(default)]
    pub orgs: OrgsConfig,
    #[serde(default)]
    pub assessment: AssessmentConfig,
}

impl SkillbenchConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or a value has the wrong type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration after reading `.env` from the current directory or the workspace root.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".skillbench/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SKILLBENCH_").split("__"))
    }

    /// Fail early when the server cannot run with this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when Clerk has no secret key, and
    /// `ConfigError::InvalidValue` when the bind address does not parse.
    pub fn validate_for_server(&self) -> Result<(), ConfigError> {
        if !self.clerk.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "clerk".into(),
            });
        }
        if self.server.bind.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "server.bind".into(),
                reason: format!("'{}' is not a socket address", self.server.bind),
            });
        }
        Ok(())
    }

    /// Copy with every non-empty secret replaced, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| {
            if s.is_empty() {
                String::new()
            } else {
                REDACTED.to_string()
            }
        };
        let mut out = self.clone();
        out.database.auth_token = mask(&self.database.auth_token);
        out.clerk.secret_key = mask(&self.clerk.secret_key);
        out.clerk.webhook_secret = mask(&self.clerk.webhook_secret);
        out.webhooks.provision_secret = mask(&self.webhooks.provision_secret);
        out.webhooks.sanity_secret = mask(&self.webhooks.sanity_secret);
        out
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skillbench").join("config.toml"))
    }

    fn load_dotenv_from_workspace() {
        if dotenvy::dotenv().is_ok() {
            return;
        }
        // Walk up from the crate dir (crate -> crates/ -> workspace) under cargo.
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = SkillbenchConfig::default();
        assert!(!config.database.is_remote());
        assert!(!config.clerk.is_configured());
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.assessment.default_template(), None);
    }

    #[test]
    fn redaction_masks_only_set_secrets() {
        let mut config = SkillbenchConfig::default();
        config.clerk.secret_key = "sk_live_abc".into();
        config.database.url = "libsql://db.turso.io".into();

        let shown = config.redacted();
        assert_eq!(shown.clerk.secret_key, REDACTED);
        assert_eq!(shown.clerk.webhook_secret, "");
        assert_eq!(shown.database.url, "libsql://db.turso.io");
    }

    #[test]
    fn server_validation_requires_clerk_and_bind() {
        let mut config = SkillbenchConfig::default();
        assert!(matches!(
            config.validate_for_server(),
            Err(ConfigError::NotConfigured { .. })
        ));

        config.clerk.secret_key = "sk_test".into();
        config.server.bind = "nowhere".into();
        assert!(matches!(
            config.validate_for_server(),
            Err(ConfigError::InvalidValue { .. })
        ));

        config.server.bind = "0.0.0.0:8080".into();
        assert!(config.validate_for_server().is_ok());
    }
}
