//! Wires the configured event sources into a `CalendarAggregator`.

use std::sync::Arc;

use anyhow::{Context, Result};
use leadcal_core::aggregator::CalendarAggregator;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::integrations::IntegrationContext;
use leadcal_core::local::{HttpEventStore, IntegrationRegistry};
use leadcal_core::remote::CalendarProvider;
use leadcal_provider_google::GoogleProvider;
use tracing::{debug, warn};

/// Build an aggregator for the configured user. Nothing is fetched yet.
pub async fn connect(config: &LeadcalConfig) -> Result<CalendarAggregator> {
    let user_id = config.user_id()?;
    let store = Arc::new(
        HttpEventStore::new(&config.backend_url, user_id)
            .context("Failed to create the event store client")?,
    );

    let integrations = load_integrations(store.as_ref(), config).await?;

    let provider: Option<Arc<dyn CalendarProvider>> = config
        .google
        .as_ref()
        .map(|settings| Arc::new(GoogleProvider::new(settings)) as Arc<dyn CalendarProvider>);

    if provider.is_none() {
        debug!("no [google] section configured, showing local events only");
    }

    Ok(CalendarAggregator::new(
        store,
        provider,
        integrations,
        config.timezone,
    )
    .with_sync_days(config.sync_days))
}

/// Ask the backend which integrations are connected, falling back to the
/// static list in the config file when the registry is unreachable.
async fn load_integrations(
    registry: &dyn IntegrationRegistry,
    config: &LeadcalConfig,
) -> Result<IntegrationContext> {
    let user_id = config.user_id()?;

    match registry.integrations().await {
        Ok(statuses) => Ok(IntegrationContext::from_statuses(user_id, &statuses)),
        Err(e) => {
            warn!("Integration registry unavailable, using config: {}", e);
            Ok(config.static_integrations()?)
        }
    }
}
