//! Terminal rendering for leadcal types.
//!
//! Extension traits that add colored output to leadcal-core types using
//! owo_colors. Times are shown in the configured timezone.

use chrono::NaiveDate;
use chrono_tz::Tz;
use leadcal_core::aggregator::{RemoteStatus, SyncOutcome};
use leadcal_core::deriver::DerivedEvent;
use leadcal_core::{CalendarEvent, DataQualityIssue, EventTime, EventType, SourceRef};
use owo_colors::OwoColorize;

pub trait Render {
    fn render(&self, tz: &Tz) -> String;
}

impl Render for CalendarEvent {
    fn render(&self, tz: &Tz) -> String {
        let source = match &self.source_ref {
            SourceRef::Remote { provider, .. } => format!("[{}]", provider),
            SourceRef::Local { .. } => "[crm]".to_string(),
        };
        format!(
            "  {} {} {} {}",
            format_time(&self.start, tz),
            colorize_type(self.event_type, &self.title),
            source.dimmed(),
            self.id.dimmed()
        )
    }
}

impl Render for DerivedEvent {
    fn render(&self, tz: &Tz) -> String {
        let mut line = format!(
            "  {} {}",
            format_time(&self.start, tz),
            colorize_type(self.event_type(), &self.title)
        );
        if let Some(ref company) = self.description {
            line.push_str(&format!(" {}", format!("({})", company).dimmed()));
        }
        if self.start_is_fallback {
            line.push_str(&format!(" {}", "(approximate)".yellow()));
        }
        line
    }
}

impl Render for DataQualityIssue {
    fn render(&self, _tz: &Tz) -> String {
        format!("{} Skipped {}", "!".yellow(), self)
    }
}

/// Color event titles by type so deadlines and demos stand out.
fn colorize_type(event_type: EventType, text: &str) -> String {
    match event_type {
        EventType::Deadline => text.red().to_string(),
        EventType::Demo => text.magenta().to_string(),
        EventType::FollowUp => text.yellow().to_string(),
        EventType::Call => text.cyan().to_string(),
        _ => text.to_string(),
    }
}

/// Format the time portion of an event (e.g. "  15:00" or "all-day")
pub fn format_time(time: &EventTime, tz: &Tz) -> String {
    match time {
        EventTime::Date(_) => "all-day".to_string(),
        EventTime::DateTime(dt) => format!("{:>7}", dt.with_timezone(tz).format("%H:%M")),
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

pub fn render_remote_status(status: &RemoteStatus) -> Option<String> {
    match status {
        RemoteStatus::Failed(reason) => Some(format!(
            "{} Google Calendar unavailable, showing CRM events only: {}",
            "!".yellow(),
            reason
        )),
        RemoteStatus::Disconnected | RemoteStatus::Included => None,
    }
}

pub fn render_sync_outcome(outcome: &SyncOutcome) -> Option<String> {
    match outcome {
        SyncOutcome::NotRequested => None,
        SyncOutcome::Unavailable => Some(format!(
            "{} Google Calendar is not connected, event was not synced",
            "!".yellow()
        )),
        SyncOutcome::Synced { provider_event_id } => Some(format!(
            "{} Synced to Google Calendar {}",
            "✓".green(),
            provider_event_id.dimmed()
        )),
        SyncOutcome::Failed { reason, .. } => Some(format!(
            "{} Google Calendar sync failed: {}",
            "✗".red(),
            reason
        )),
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_time_uses_display_timezone() {
        let dt = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();

        assert_eq!(format_time(&EventTime::DateTime(dt), &tz), "  12:00");
        assert_eq!(
            format_time(&EventTime::Date(dt.date_naive()), &tz),
            "all-day"
        );
    }

    #[test]
    fn test_format_date_label() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 24).unwrap();

        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(today.succ_opt().unwrap(), today), "Tomorrow");
        assert_eq!(
            format_date_label(NaiveDate::from_ymd_opt(2025, 2, 26).unwrap(), today),
            "Wed Feb 26"
        );
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("event", 1), "event");
        assert_eq!(pluralize("event", 3), "events");
    }

    #[test]
    fn test_included_remote_status_is_silent() {
        assert!(render_remote_status(&RemoteStatus::Included).is_none());
        assert!(render_remote_status(&RemoteStatus::Failed("timeout".into())).is_some());
    }
}
