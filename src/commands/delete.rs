use anyhow::Result;
use leadcal_core::config::LeadcalConfig;
use owo_colors::OwoColorize;

use crate::session;

pub async fn run(config: &LeadcalConfig, id: &str) -> Result<()> {
    let aggregator = session::connect(config).await?;
    aggregator.fetch_events(None).await?;

    aggregator.delete_event(id).await?;

    println!("{} Deleted {}", "✓".green(), id);
    Ok(())
}
