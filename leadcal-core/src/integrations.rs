//! Which third-party integrations are connected for the active user.
//!
//! The aggregator receives an `IntegrationContext` when it is built and
//! consults it before every remote call. The context is a read-only value:
//! refreshing connection status means building a new aggregator.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LeadcalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integration {
    Google,
    Meta,
    Whatsapp,
}

impl Integration {
    pub fn name(&self) -> &'static str {
        match self {
            Integration::Google => "google",
            Integration::Meta => "meta",
            Integration::Whatsapp => "whatsapp",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Integration {
    type Err = LeadcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Integration::Google),
            "meta" => Ok(Integration::Meta),
            "whatsapp" => Ok(Integration::Whatsapp),
            _ => Err(LeadcalError::Config(format!("Unknown integration '{}'", s))),
        }
    }
}

/// One row of the integration registry, as the backend reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationStatus {
    pub provider: String,
    pub connected: bool,
}

/// Capability object: who the user is and what they have connected.
#[derive(Debug, Clone, Default)]
pub struct IntegrationContext {
    user_id: String,
    connected: HashSet<Integration>,
}

impl IntegrationContext {
    pub fn new(user_id: &str, connected: impl IntoIterator<Item = Integration>) -> Self {
        IntegrationContext {
            user_id: user_id.to_string(),
            connected: connected.into_iter().collect(),
        }
    }

    /// Build from registry rows. Unknown providers are ignored.
    pub fn from_statuses(user_id: &str, statuses: &[IntegrationStatus]) -> Self {
        let connected = statuses
            .iter()
            .filter(|s| s.connected)
            .filter_map(|s| s.provider.parse().ok());
        IntegrationContext::new(user_id, connected)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn is_connected(&self, integration: Integration) -> bool {
        self.connected.contains(&integration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_statuses_keeps_only_connected_known_providers() {
        let statuses = vec![
            IntegrationStatus {
                provider: "google".to_string(),
                connected: true,
            },
            IntegrationStatus {
                provider: "meta".to_string(),
                connected: false,
            },
            IntegrationStatus {
                provider: "hubspot".to_string(),
                connected: true,
            },
        ];

        let ctx = IntegrationContext::from_statuses("user-1", &statuses);

        assert_eq!(ctx.user_id(), "user-1");
        assert!(ctx.is_connected(Integration::Google));
        assert!(!ctx.is_connected(Integration::Meta));
        assert!(!ctx.is_connected(Integration::Whatsapp));
    }
}
