use anyhow::Result;
use clap::Args;
use leadcal_core::config::LeadcalConfig;
use leadcal_core::{EventTime, EventType, NewEvent};
use owo_colors::OwoColorize;

use crate::render::{Render, render_sync_outcome};
use crate::session;

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Event title
    pub title: String,

    /// Start date or date/time (e.g., "2025-03-20" or "2025-03-20T15:00")
    #[arg(short, long)]
    pub start: String,

    /// End date or date/time; all-day events take the last day, inclusive
    #[arg(short, long)]
    pub end: Option<String>,

    /// meeting, call, demo, proposal, follow_up, deadline or other
    #[arg(short = 't', long = "type", default_value = "meeting")]
    pub event_type: EventType,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Attendee email or contact id (repeatable)
    #[arg(short, long = "attendee")]
    pub attendees: Vec<String>,

    /// Reminder before the start, in minutes
    #[arg(long)]
    pub reminder: Option<i64>,

    /// Lead this event belongs to
    #[arg(long)]
    pub lead: Option<String>,

    /// Also create the event on Google Calendar
    #[arg(long)]
    pub sync: bool,
}

impl NewArgs {
    fn into_new_event(self) -> Result<NewEvent> {
        let start: EventTime = self.start.parse()?;
        let end = self.end.as_deref().map(str::parse::<EventTime>).transpose()?;

        let mut event = NewEvent::new(&self.title, start);
        event.end = end;
        event.event_type = self.event_type;
        event.description = self.description;
        event.location = self.location;
        event.attendees = self.attendees;
        event.reminder_minutes = self.reminder;
        event.lead_ref = self.lead;
        Ok(event)
    }
}

pub async fn run(config: &LeadcalConfig, args: NewArgs) -> Result<()> {
    let sync = args.sync;
    let input = args.into_new_event()?;
    input.validate()?;

    let aggregator = session::connect(config).await?;
    aggregator.fetch_events(None).await?;

    let outcome = aggregator.create_event(input, sync).await?;

    println!(
        "{} Created {}",
        "✓".green(),
        outcome.event.render(&aggregator.timezone()).trim_start()
    );
    if let Some(line) = render_sync_outcome(&outcome.sync) {
        println!("{}", line);
    }

    Ok(())
}
