use anyhow::{Result, bail};
use leadcal_core::remote::{ProviderAttendee, ProviderEvent, ProviderTime};

pub trait FromGoogle {
    fn from_google(event: google_calendar::types::Event) -> Result<Self>
    where
        Self: Sized;
}

impl FromGoogle for ProviderEvent {
    fn from_google(event: google_calendar::types::Event) -> Result<Self> {
        if event.id.is_empty() {
            bail!("Event has no id");
        }

        let start = match event.start {
            Some(ref start) => time_from_google(start),
            None => bail!("Event has no start time"),
        };

        let attendees = event
            .attendees
            .iter()
            .map(|a| ProviderAttendee {
                email: non_empty(&a.email),
                display_name: non_empty(&a.display_name),
            })
            .collect();

        Ok(ProviderEvent {
            id: event.id,
            summary: event.summary,
            description: non_empty(&event.description),
            location: non_empty(&event.location),
            start,
            end: event.end.as_ref().map(time_from_google),
            attendees,
        })
    }
}

/// Whether Google reports the event as deleted. Cancelled events stay in
/// list responses and must not be shown.
pub(crate) fn is_cancelled(event: &google_calendar::types::Event) -> bool {
    event.status == "cancelled"
}

fn time_from_google(time: &google_calendar::types::EventDateTime) -> ProviderTime {
    ProviderTime {
        date: time.date,
        date_time: time.date_time,
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use google_calendar::types::{Event, EventAttendee, EventDateTime};

    fn google_time(date: Option<NaiveDate>, date_time: Option<chrono::DateTime<Utc>>) -> EventDateTime {
        EventDateTime {
            date,
            date_time,
            time_zone: String::new(),
        }
    }

    #[test]
    fn test_from_google_timed_event() {
        let start = Utc.with_ymd_and_hms(2025, 3, 20, 15, 0, 0).unwrap();
        let event = Event {
            id: "g1".to_string(),
            summary: "Pipeline review".to_string(),
            location: "Room 4".to_string(),
            start: Some(google_time(None, Some(start))),
            end: Some(google_time(None, Some(start + chrono::Duration::hours(1)))),
            attendees: vec![EventAttendee {
                email: "alice@example.com".to_string(),
                display_name: String::new(),
                response_status: "accepted".to_string(),
                additional_guests: 0,
                comment: String::new(),
                id: String::new(),
                optional: false,
                organizer: false,
                resource: false,
                self_: false,
            }],
            ..Default::default()
        };

        let converted = ProviderEvent::from_google(event).unwrap();

        assert_eq!(converted.id, "g1");
        assert_eq!(converted.start.date_time, Some(start));
        assert!(converted.description.is_none());
        assert_eq!(converted.location.as_deref(), Some("Room 4"));
        assert_eq!(converted.attendees[0].email.as_deref(), Some("alice@example.com"));
        assert!(converted.attendees[0].display_name.is_none());
    }

    #[test]
    fn test_from_google_all_day_keeps_exclusive_end() {
        let event = Event {
            id: "g2".to_string(),
            start: Some(google_time(NaiveDate::from_ymd_opt(2025, 3, 20), None)),
            end: Some(google_time(NaiveDate::from_ymd_opt(2025, 3, 21), None)),
            ..Default::default()
        };

        let converted = ProviderEvent::from_google(event).unwrap();

        assert_eq!(converted.end.unwrap().date, NaiveDate::from_ymd_opt(2025, 3, 21));
    }

    #[test]
    fn test_from_google_rejects_missing_start_and_id() {
        let no_start = Event {
            id: "g3".to_string(),
            ..Default::default()
        };
        assert!(ProviderEvent::from_google(no_start).is_err());

        assert!(ProviderEvent::from_google(Event::default()).is_err());
    }

    #[test]
    fn test_cancelled_detection() {
        let event = Event {
            status: "cancelled".to_string(),
            ..Default::default()
        };
        assert!(is_cancelled(&event));
        assert!(!is_cancelled(&Event::default()));
    }
}
