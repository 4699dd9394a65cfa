//! Remote calendar providers (Google Calendar today).
//!
//! Providers speak their own event shape (`ProviderEvent`); `normalize`
//! converts it to and from the unified `CalendarEvent`.

pub mod normalize;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::LeadcalResult;
use crate::integrations::Integration;

/// A provider timestamp: date-only for all-day events, an instant otherwise.
///
/// All-day end dates are exclusive, as the provider APIs report them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderTime {
    pub date: Option<NaiveDate>,
    pub date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderAttendee {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// An event as a provider returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderEvent {
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: ProviderTime,
    pub end: Option<ProviderTime>,
    pub attendees: Vec<ProviderAttendee>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderCalendar {
    pub id: String,
    pub name: String,
    pub primary: bool,
}

/// Pick the account's primary calendar, or the first one if none is flagged.
pub fn primary_calendar(calendars: &[ProviderCalendar]) -> Option<&ProviderCalendar> {
    calendars
        .iter()
        .find(|c| c.primary)
        .or_else(|| calendars.first())
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// The integration whose connection status gates this provider.
    fn integration(&self) -> Integration;

    async fn list_calendars(&self) -> LeadcalResult<Vec<ProviderCalendar>>;

    async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
    ) -> LeadcalResult<Vec<ProviderEvent>>;

    /// Create `event` on `calendar_id`; returns the event with its provider id.
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &ProviderEvent,
    ) -> LeadcalResult<ProviderEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(id: &str, primary: bool) -> ProviderCalendar {
        ProviderCalendar {
            id: id.to_string(),
            name: id.to_string(),
            primary,
        }
    }

    #[test]
    fn test_primary_calendar_prefers_flagged_calendar() {
        let calendars = vec![calendar("team", false), calendar("me@example.com", true)];
        assert_eq!(primary_calendar(&calendars).unwrap().id, "me@example.com");
    }

    #[test]
    fn test_primary_calendar_falls_back_to_first() {
        let calendars = vec![calendar("team", false), calendar("holidays", false)];
        assert_eq!(primary_calendar(&calendars).unwrap().id, "team");
        assert!(primary_calendar(&[]).is_none());
    }
}
