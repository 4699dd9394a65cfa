use anyhow::Result;
use clap::Args;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::{EventPatch, EventStatus, EventTime, EventType};
use owo_colors::OwoColorize;

use crate::render::Render;
use crate::session;

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Event id (as shown by `leadcal events`)
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub start: Option<String>,

    #[arg(short, long)]
    pub end: Option<String>,

    #[arg(short = 't', long = "type")]
    pub event_type: Option<EventType>,

    /// scheduled, completed, cancelled or postponed
    #[arg(long)]
    pub status: Option<EventStatus>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,
}

impl UpdateArgs {
    fn patch(&self) -> Result<EventPatch> {
        let parse = |s: &Option<String>| s.as_deref().map(str::parse::<EventTime>).transpose();

        Ok(EventPatch {
            title: self.title.clone(),
            description: self.description.clone(),
            start: parse(&self.start)?,
            end: parse(&self.end)?,
            event_type: self.event_type,
            status: self.status,
            location: self.location.clone(),
            ..Default::default()
        })
    }
}

pub async fn run(config: &LeadcalConfig, args: UpdateArgs) -> Result<()> {
    let patch = args.patch()?;
    if patch.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one of --title, --start, --end, --type, --status, --description or --location");
    }

    let aggregator = session::connect(config).await?;
    aggregator.fetch_events(None).await?;

    let updated = aggregator.update_event(&args.id, patch).await?;

    println!(
        "{} Updated {}",
        "✓".green(),
        updated.render(&aggregator.timezone()).trim_start()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_only_carries_given_fields() {
        let args = UpdateArgs {
            id: "a1".to_string(),
            title: Some("Renamed".to_string()),
            status: Some(EventStatus::Completed),
            ..Default::default()
        };

        let patch = args.patch().unwrap();

        assert_eq!(patch.title.as_deref(), Some("Renamed"));
        assert_eq!(patch.status, Some(EventStatus::Completed));
        assert!(patch.start.is_none());
        assert!(patch.linked_provider_event_id.is_none());
    }

    #[test]
    fn test_empty_args_give_empty_patch() {
        let args = UpdateArgs {
            id: "a1".to_string(),
            ..Default::default()
        };
        assert!(args.patch().unwrap().is_empty());
    }
}
