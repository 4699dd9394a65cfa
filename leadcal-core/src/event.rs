//! Unified calendar event types.
//!
//! Both event sources (the CRM's own event store and the remote calendar
//! provider) are normalized into `CalendarEvent`. Everything downstream of
//! the aggregator works exclusively with these types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{LeadcalError, LeadcalResult};

/// A point on the calendar: either a whole day or an exact instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    /// The instant this time starts at. Dates start at 00:00 UTC.
    pub fn start_instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN).and_utc(),
            EventTime::DateTime(dt) => *dt,
        }
    }

    /// Like `start_instant`, but dates start at midnight in `tz`.
    pub fn start_instant_in(&self, tz: &Tz) -> DateTime<Utc> {
        match self {
            EventTime::Date(d) => local_midnight(*d, tz),
            EventTime::DateTime(dt) => *dt,
        }
    }

    /// Calendar day this time falls on when displayed in `tz`.
    ///
    /// Dates are floating and never shift across timezones.
    pub fn day_in(&self, tz: &Tz) -> NaiveDate {
        match self {
            EventTime::Date(d) => *d,
            EventTime::DateTime(dt) => dt.with_timezone(tz).date_naive(),
        }
    }

    /// Shift by a duration. A date becomes a timed value starting at 00:00 UTC.
    pub fn plus(&self, duration: Duration) -> EventTime {
        EventTime::DateTime(self.start_instant() + duration)
    }
}

impl FromStr for EventTime {
    type Err = LeadcalError;

    /// Accepts `YYYY-MM-DD`, RFC 3339, or `YYYY-MM-DDTHH:MM[:SS]` (read as UTC).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(EventTime::Date(d));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(EventTime::DateTime(dt.with_timezone(&Utc)));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(EventTime::DateTime(dt.and_utc()));
            }
        }

        Err(LeadcalError::Validation(format!(
            "Invalid date/time '{}'. Expected YYYY-MM-DD or RFC 3339",
            s
        )))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M UTC")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[default]
    Meeting,
    Call,
    Demo,
    Proposal,
    FollowUp,
    Deadline,
    Other,
}

impl FromStr for EventType {
    type Err = LeadcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meeting" => Ok(EventType::Meeting),
            "call" => Ok(EventType::Call),
            "demo" => Ok(EventType::Demo),
            "proposal" => Ok(EventType::Proposal),
            "follow_up" => Ok(EventType::FollowUp),
            "deadline" => Ok(EventType::Deadline),
            "other" => Ok(EventType::Other),
            _ => Err(LeadcalError::Validation(format!("Unknown event type '{}'", s))),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventType::Meeting => "meeting",
            EventType::Call => "call",
            EventType::Demo => "demo",
            EventType::Proposal => "proposal",
            EventType::FollowUp => "follow_up",
            EventType::Deadline => "deadline",
            EventType::Other => "other",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Postponed,
}

impl FromStr for EventStatus {
    type Err = LeadcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(EventStatus::Scheduled),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            "postponed" => Ok(EventStatus::Postponed),
            _ => Err(LeadcalError::Validation(format!("Unknown event status '{}'", s))),
        }
    }
}

/// Where an event lives. Mutations are dispatched on this, never on the id string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRef {
    Local {
        local_id: String,
    },
    Remote {
        provider: String,
        provider_event_id: String,
        provider_calendar_id: String,
    },
}

impl SourceRef {
    pub fn is_remote(&self) -> bool {
        matches!(self, SourceRef::Remote { .. })
    }
}

/// A calendar event as the aggregator exposes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique across the merged set. Remote ids carry a provider prefix.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: EventTime,
    /// Absent for point-in-time or open-ended events.
    pub end: Option<EventTime>,
    pub event_type: EventType,
    pub status: EventStatus,
    pub location: Option<String>,
    /// Contact identifiers (emails for provider events).
    pub attendees: Vec<String>,
    pub reminder_minutes: Option<i64>,
    pub source_ref: SourceRef,
    /// Id of the lead this event belongs to. Not an owning reference.
    pub lead_ref: Option<String>,
    /// Provider event this local event was pushed to, if any.
    pub linked_provider_event_id: Option<String>,
}

impl CalendarEvent {
    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    pub fn is_remote(&self) -> bool {
        self.source_ref.is_remote()
    }

    /// First and last calendar day the event touches, in `tz`.
    pub fn day_span(&self, tz: &Tz) -> (NaiveDate, NaiveDate) {
        day_span(&self.start, self.end.as_ref(), tz)
    }

    /// True when the event starts on, ends on, or spans across `date`.
    pub fn touches_day(&self, date: NaiveDate, tz: &Tz) -> bool {
        let (first, last) = self.day_span(tz);
        first == date || last == date || (first < date && date < last)
    }

    /// True when the event touches any day of the inclusive range `[from, to]`.
    pub fn touches_range(&self, from: NaiveDate, to: NaiveDate, tz: &Tz) -> bool {
        let (first, last) = self.day_span(tz);
        let starts_inside = first >= from && first <= to;
        let ends_inside = last >= from && last <= to;
        let covers_range = first <= from && last >= to;
        starts_inside || ends_inside || covers_range
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

pub(crate) fn day_span(start: &EventTime, end: Option<&EventTime>, tz: &Tz) -> (NaiveDate, NaiveDate) {
    let first = start.day_in(tz);
    let last = match end {
        // A timed end at local midnight is exclusive: the event stops with the previous day
        Some(EventTime::DateTime(end)) if *end > start.start_instant() => {
            let local = end.with_timezone(tz);
            if local.time() == NaiveTime::MIN {
                local.date_naive() - Duration::days(1)
            } else {
                local.date_naive()
            }
        }
        Some(end) => end.day_in(tz),
        None => first,
    };
    (first, last.max(first))
}

/// First instant of `date` in `tz`, falling back to UTC midnight on DST gaps.
pub(crate) fn local_midnight(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Check the start/end pair of an event.
///
/// Both sides must be the same kind (all-day or timed) and `end` may not
/// precede `start`. For all-day events `end` is the last day, inclusive.
pub fn validate_span(start: &EventTime, end: Option<&EventTime>) -> LeadcalResult<()> {
    let Some(end) = end else {
        return Ok(());
    };

    if start.is_date() != end.is_date() {
        return Err(LeadcalError::Validation(format!(
            "start ({}) and end ({}) must both be dates or both be date-times",
            start, end
        )));
    }

    if end.start_instant() < start.start_instant() {
        return Err(LeadcalError::Validation(format!(
            "end ({}) is before start ({})",
            end, start
        )));
    }

    Ok(())
}

fn validate_title(title: &str) -> LeadcalResult<()> {
    if title.trim().is_empty() {
        return Err(LeadcalError::Validation("title is required".into()));
    }
    Ok(())
}

/// Input for creating an event in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: EventTime,
    pub end: Option<EventTime>,
    pub event_type: EventType,
    pub status: EventStatus,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub reminder_minutes: Option<i64>,
    pub lead_ref: Option<String>,
}

impl NewEvent {
    pub fn new(title: &str, start: EventTime) -> Self {
        NewEvent {
            title: title.to_string(),
            description: None,
            start,
            end: None,
            event_type: EventType::default(),
            status: EventStatus::default(),
            location: None,
            attendees: Vec::new(),
            reminder_minutes: None,
            lead_ref: None,
        }
    }

    pub fn validate(&self) -> LeadcalResult<()> {
        validate_title(&self.title)?;
        validate_span(&self.start, self.end.as_ref())
    }
}

/// Partial update for a local event. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
    pub location: Option<String>,
    pub attendees: Option<Vec<String>>,
    pub reminder_minutes: Option<i64>,
    pub linked_provider_event_id: Option<String>,
}

impl EventPatch {
    pub fn link_provider_event(provider_event_id: &str) -> Self {
        EventPatch {
            linked_provider_event_id: Some(provider_event_id.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }

    /// Validate the patch, against the current event when it is known.
    pub fn validate(&self, current: Option<&CalendarEvent>) -> LeadcalResult<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }

        let start = self.start.or(current.map(|c| c.start));
        let end = self.end.or(current.and_then(|c| c.end));
        match start {
            Some(start) => validate_span(&start, end.as_ref()),
            None => Ok(()),
        }
    }
}

/// Which source a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Local,
    Remote,
}

/// A record that could not be normalized because its data is inconsistent.
///
/// These are kept out of the snapshot and reported instead of being repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub source: EventSource,
    pub record_id: String,
    pub reason: String,
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            EventSource::Local => "local",
            EventSource::Remote => "remote",
        };
        write!(f, "{} event {}: {}", source, self.record_id, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timed(y: i32, m: u32, d: u32, h: u32) -> EventTime {
        EventTime::DateTime(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn local_event(start: EventTime, end: Option<EventTime>) -> CalendarEvent {
        CalendarEvent {
            id: "evt-1".to_string(),
            title: "Kickoff".to_string(),
            description: None,
            start,
            end,
            event_type: EventType::Meeting,
            status: EventStatus::Scheduled,
            location: None,
            attendees: vec![],
            reminder_minutes: None,
            source_ref: SourceRef::Local {
                local_id: "evt-1".to_string(),
            },
            lead_ref: None,
            linked_provider_event_id: None,
        }
    }

    #[test]
    fn test_parse_event_time_variants() {
        assert_eq!(
            "2025-03-20".parse::<EventTime>().unwrap(),
            EventTime::Date(date(2025, 3, 20))
        );
        assert_eq!(
            "2025-03-20T15:00:00Z".parse::<EventTime>().unwrap(),
            timed(2025, 3, 20, 15)
        );
        assert_eq!(
            "2025-03-20T18:00:00+03:00".parse::<EventTime>().unwrap(),
            timed(2025, 3, 20, 15)
        );
        assert_eq!(
            "2025-03-20T15:00".parse::<EventTime>().unwrap(),
            timed(2025, 3, 20, 15)
        );
        assert!("next tuesday".parse::<EventTime>().is_err());
    }

    #[test]
    fn test_day_in_shifts_timed_events_but_not_dates() {
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        // 01:00 UTC is still the previous evening in Sao Paulo
        assert_eq!(timed(2025, 3, 20, 1).day_in(&tz), date(2025, 3, 19));
        assert_eq!(EventTime::Date(date(2025, 3, 20)).day_in(&tz), date(2025, 3, 20));
    }

    #[test]
    fn test_end_at_midnight_does_not_touch_next_day() {
        let late_call = local_event(timed(2025, 3, 20, 22), Some(timed(2025, 3, 21, 0)));
        let tz = Tz::UTC;

        assert!(late_call.touches_day(date(2025, 3, 20), &tz));
        assert!(!late_call.touches_day(date(2025, 3, 21), &tz));
        assert!(!late_call.touches_range(date(2025, 3, 21), date(2025, 3, 27), &tz));

        // Midnight in the display timezone, not UTC, is the boundary
        let sao_paulo: Tz = "America/Sao_Paulo".parse().unwrap();
        let evening = local_event(timed(2025, 3, 20, 23), Some(timed(2025, 3, 21, 3)));
        assert!(!evening.touches_day(date(2025, 3, 21), &sao_paulo));

        // A zero-length event at midnight stays on its own day
        let marker = local_event(timed(2025, 3, 21, 0), Some(timed(2025, 3, 21, 0)));
        assert!(marker.touches_day(date(2025, 3, 21), &tz));
    }

    #[test]
    fn test_start_instant_in_anchors_dates_to_local_midnight() {
        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        assert_eq!(
            EventTime::Date(date(2025, 5, 2)).start_instant_in(&tz),
            Utc.with_ymd_and_hms(2025, 5, 2, 3, 0, 0).unwrap()
        );
        assert_eq!(timed(2025, 5, 2, 14).start_instant_in(&tz), Utc.with_ymd_and_hms(2025, 5, 2, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_touches_day_for_multi_day_span() {
        let event = local_event(timed(2025, 3, 10, 9), Some(timed(2025, 3, 14, 17)));
        let tz = Tz::UTC;

        assert!(event.touches_day(date(2025, 3, 10), &tz));
        assert!(event.touches_day(date(2025, 3, 12), &tz));
        assert!(event.touches_day(date(2025, 3, 14), &tz));
        assert!(!event.touches_day(date(2025, 3, 9), &tz));
        assert!(!event.touches_day(date(2025, 3, 15), &tz));
    }

    #[test]
    fn test_touches_range_when_event_covers_whole_range() {
        let event = local_event(timed(2025, 3, 1, 9), Some(timed(2025, 3, 31, 17)));
        let tz = Tz::UTC;

        assert!(event.touches_range(date(2025, 3, 10), date(2025, 3, 16), &tz));
        assert!(event.touches_range(date(2025, 2, 25), date(2025, 3, 1), &tz));
        assert!(!event.touches_range(date(2025, 4, 1), date(2025, 4, 7), &tz));
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let mut input = NewEvent::new("Call with ACME", timed(2025, 3, 20, 15));
        input.end = Some(timed(2025, 3, 20, 14));

        let err = input.validate().unwrap_err();
        assert!(matches!(err, LeadcalError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_blank_title_and_mixed_kinds() {
        let blank = NewEvent::new("   ", timed(2025, 3, 20, 15));
        assert!(blank.validate().is_err());

        let mut mixed = NewEvent::new("Offsite", EventTime::Date(date(2025, 3, 20)));
        mixed.end = Some(timed(2025, 3, 21, 10));
        assert!(mixed.validate().is_err());

        let mut ok = NewEvent::new("Offsite", EventTime::Date(date(2025, 3, 20)));
        ok.end = Some(EventTime::Date(date(2025, 3, 20)));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_patch_validates_against_current_event() {
        let event = local_event(timed(2025, 3, 20, 15), Some(timed(2025, 3, 20, 16)));

        let moves_start_past_end = EventPatch {
            start: Some(timed(2025, 3, 20, 17)),
            ..Default::default()
        };
        assert!(moves_start_past_end.validate(Some(&event)).is_err());
        assert!(moves_start_past_end.validate(None).is_ok());

        assert!(EventPatch::link_provider_event("g-1").validate(Some(&event)).is_ok());
    }
}
