//! leadcal configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SYNC_DAYS;
use crate::error::{LeadcalError, LeadcalResult};
use crate::integrations::{Integration, IntegrationContext};
use crate::navigation::Granularity;

static DEFAULT_BACKEND_URL: &str = "http://localhost:3000/api";
static DEFAULT_GOOGLE_REDIRECT_URI: &str = "http://localhost:8085/callback";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LEADCAL_CONFIG";

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_sync_days() -> i64 {
    DEFAULT_SYNC_DAYS
}

fn default_google_redirect_uri() -> String {
    DEFAULT_GOOGLE_REDIRECT_URI.to_string()
}

/// Google Calendar credentials. Obtaining the tokens is outside leadcal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_google_redirect_uri")]
    pub redirect_uri: String,
}

/// Configuration at ~/.config/leadcal/config.toml
///
/// Every key can also be set through `LEADCAL_<KEY>` environment variables
/// (nested keys use `__`, e.g. `LEADCAL_GOOGLE__ACCESS_TOKEN`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadcalConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default)]
    pub user_id: Option<String>,

    /// Timezone used to decide which calendar day an event falls on.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,

    #[serde(default)]
    pub default_view: Granularity,

    #[serde(default = "default_sync_days")]
    pub sync_days: i64,

    /// Used when the backend's integration registry can't be reached.
    #[serde(default)]
    pub connected_integrations: Vec<Integration>,

    #[serde(default)]
    pub google: Option<GoogleSettings>,
}

impl LeadcalConfig {
    pub fn config_path() -> LeadcalResult<PathBuf> {
        if let Ok(custom) = std::env::var(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(shellexpand::tilde(&custom).into_owned()));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| LeadcalError::Config("Could not determine config directory".into()))?
            .join("leadcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template on first run.
    pub fn load() -> LeadcalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> LeadcalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("LEADCAL").separator("__"))
            .build()
            .map_err(|e| LeadcalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| LeadcalError::Config(e.to_string()))
    }

    pub fn user_id(&self) -> LeadcalResult<&str> {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                LeadcalError::Config(
                    "user_id is not set. Add it to the config file or set LEADCAL_USER_ID".into(),
                )
            })
    }

    /// Integration context from the static `connected_integrations` list.
    pub fn static_integrations(&self) -> LeadcalResult<IntegrationContext> {
        Ok(IntegrationContext::new(
            self.user_id()?,
            self.connected_integrations.iter().copied(),
        ))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> LeadcalResult<()> {
        let contents = format!(
            "\
# leadcal configuration

# CRM backend serving /calendar/events and /integrations:
# backend_url = \"{}\"

# Your CRM user id (sent as the x-user-id header):
# user_id = \"\"

# Timezone used to place events on calendar days:
# timezone = \"America/Sao_Paulo\"

# Initial view: month, week or day
# default_view = \"month\"

# Google Calendar access (tokens come from the CRM's OAuth flow):
# [google]
# client_id = \"\"
# client_secret = \"\"
# access_token = \"\"
# refresh_token = \"\"
",
            DEFAULT_BACKEND_URL
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LeadcalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| LeadcalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_template_loads_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadcal").join("config.toml");

        LeadcalConfig::create_default_config(&path).unwrap();
        let config = LeadcalConfig::load_from(&path).unwrap();

        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(config.default_view, Granularity::Month);
        assert_eq!(config.sync_days, DEFAULT_SYNC_DAYS);
        assert!(config.google.is_none());
        assert!(config.user_id().is_err());
    }

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
backend_url = "https://crm.example.com/api"
user_id = "user-42"
timezone = "America/Sao_Paulo"
default_view = "week"
connected_integrations = ["google"]

[google]
client_id = "id"
client_secret = "secret"
access_token = "token"
"#,
        )
        .unwrap();

        let config = LeadcalConfig::load_from(&path).unwrap();

        assert_eq!(config.user_id().unwrap(), "user-42");
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.default_view, Granularity::Week);
        let google = config.google.as_ref().unwrap();
        assert_eq!(google.redirect_uri, DEFAULT_GOOGLE_REDIRECT_URI);
        assert!(google.refresh_token.is_empty());

        let ctx = config.static_integrations().unwrap();
        assert!(ctx.is_connected(Integration::Google));
    }
}
