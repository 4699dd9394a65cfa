//! Conversion between provider events and the unified event shape.

use chrono::Duration;

use crate::event::{
    CalendarEvent, DataQualityIssue, EventSource, EventStatus, EventTime, EventType, NewEvent,
    SourceRef, validate_span,
};
use crate::integrations::Integration;
use crate::remote::{ProviderAttendee, ProviderEvent, ProviderTime};

const UNTITLED: &str = "(No title)";

/// Id under which a provider event appears in the merged set.
pub fn namespaced_id(integration: Integration, provider_event_id: &str) -> String {
    format!("{}-{}", integration.name(), provider_event_id)
}

fn issue(event_id: &str, reason: &str) -> DataQualityIssue {
    DataQualityIssue {
        source: EventSource::Remote,
        record_id: event_id.to_string(),
        reason: reason.to_string(),
    }
}

fn from_provider_time(time: &ProviderTime) -> Option<EventTime> {
    match (time.date_time, time.date) {
        (Some(dt), _) => Some(EventTime::DateTime(dt)),
        (None, Some(d)) => Some(EventTime::Date(d)),
        (None, None) => None,
    }
}

fn to_provider_time(time: &EventTime) -> ProviderTime {
    match time {
        EventTime::Date(d) => ProviderTime {
            date: Some(*d),
            date_time: None,
        },
        EventTime::DateTime(dt) => ProviderTime {
            date: None,
            date_time: Some(*dt),
        },
    }
}

/// Flatten provider attendees to contact identifiers: email, else display name.
fn flatten_attendees(attendees: &[ProviderAttendee]) -> Vec<String> {
    attendees
        .iter()
        .filter_map(|a| {
            a.email
                .as_deref()
                .or(a.display_name.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect()
}

/// Normalize a provider event into the unified shape.
///
/// The id is namespaced with the provider name, the type is always
/// `meeting` and the status always `scheduled`. All-day end dates are
/// converted from the provider's exclusive form to an inclusive last day.
pub fn from_provider(
    event: ProviderEvent,
    integration: Integration,
    calendar_id: &str,
) -> Result<CalendarEvent, DataQualityIssue> {
    let start = from_provider_time(&event.start)
        .ok_or_else(|| issue(&event.id, "event has no start time"))?;

    let end = match event.end.as_ref().and_then(from_provider_time) {
        Some(EventTime::Date(end)) if start.is_date() && end > start.start_instant().date_naive() => {
            Some(EventTime::Date(end - Duration::days(1)))
        }
        other => other,
    };

    validate_span(&start, end.as_ref()).map_err(|e| issue(&event.id, &e.to_string()))?;

    let title = match event.summary.trim() {
        "" => UNTITLED.to_string(),
        s => s.to_string(),
    };

    Ok(CalendarEvent {
        id: namespaced_id(integration, &event.id),
        title,
        description: event.description.filter(|d| !d.is_empty()),
        start,
        end,
        event_type: EventType::Meeting,
        status: EventStatus::Scheduled,
        location: event.location.filter(|l| !l.is_empty()),
        attendees: flatten_attendees(&event.attendees),
        reminder_minutes: None,
        source_ref: SourceRef::Remote {
            provider: integration.name().to_string(),
            provider_event_id: event.id,
            provider_calendar_id: calendar_id.to_string(),
        },
        lead_ref: None,
        linked_provider_event_id: None,
    })
}

/// Translate a new local event into the provider's shape.
///
/// All-day events get an exclusive end date (the day after the last day);
/// timed events without an end become zero-length.
pub fn to_provider(event: &NewEvent) -> ProviderEvent {
    let end = match (&event.start, &event.end) {
        (EventTime::Date(start), None) => EventTime::Date(*start + Duration::days(1)),
        (EventTime::Date(_), Some(EventTime::Date(last))) => EventTime::Date(*last + Duration::days(1)),
        (_, Some(end)) => *end,
        (start, None) => *start,
    };

    ProviderEvent {
        id: String::new(),
        summary: event.title.trim().to_string(),
        description: event.description.clone(),
        location: event.location.clone(),
        start: to_provider_time(&event.start),
        end: Some(to_provider_time(&end)),
        attendees: event
            .attendees
            .iter()
            .filter(|a| a.contains('@'))
            .map(|a| ProviderAttendee {
                email: Some(a.clone()),
                display_name: None,
            })
            .collect(),
    }
}
