//! Google Calendar API access.

use anyhow::{Context, Result};
use async_trait::async_trait;
use google_calendar::Client;
use google_calendar::types::{MinAccessRole, OrderBy, SendUpdates};
use leadcal_core::config::GoogleSettings;
use leadcal_core::date_range::DateRange;
use leadcal_core::integrations::Integration;
use leadcal_core::remote::{CalendarProvider, ProviderCalendar, ProviderEvent};
use leadcal_core::{LeadcalError, LeadcalResult};
use tracing::{debug, instrument, warn};

use crate::convert::{FromGoogle, ToGoogle, is_cancelled};

/// Flags passed to `events().list_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EventQuery {
    show_deleted: bool,
    show_hidden_invitations: bool,
    /// Expand recurring series into one instance per occurrence inside the window.
    single_events: bool,
}

const EVENT_QUERY: EventQuery = EventQuery {
    show_deleted: false,
    show_hidden_invitations: false,
    single_events: true,
};

pub struct GoogleProvider {
    client: Client,
}

impl GoogleProvider {
    pub fn new(settings: &GoogleSettings) -> Self {
        GoogleProvider {
            client: Client::new(
                settings.client_id.clone(),
                settings.client_secret.clone(),
                settings.redirect_uri.clone(),
                settings.access_token.clone(),
                settings.refresh_token.clone(),
            ),
        }
    }

    async fn fetch_calendars(&self) -> Result<Vec<ProviderCalendar>> {
        let response = self
            .client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .context("Failed to fetch calendars")?;

        Ok(response
            .body
            .into_iter()
            .filter(|c| !c.id.is_empty())
            .map(|c| ProviderCalendar {
                id: c.id,
                name: if c.summary.is_empty() {
                    "(unnamed)".to_string()
                } else {
                    c.summary
                },
                primary: c.primary,
            })
            .collect())
    }

    async fn fetch_events(&self, calendar_id: &str, range: &DateRange) -> Result<Vec<ProviderEvent>> {
        let time_min = range.from_rfc3339();
        let time_max = range.to_rfc3339();

        let response = self
            .client
            .events()
            .list_all(
                calendar_id,
                "",
                0,
                OrderBy::default(),
                &[],
                "", // search query
                &[],
                EVENT_QUERY.show_deleted,
                EVENT_QUERY.show_hidden_invitations,
                EVENT_QUERY.single_events,
                &time_max,
                &time_min,
                "",
                "",
            )
            .await
            .context("Failed to fetch events")?;

        let mut events = Vec::new();

        for event in response.body {
            if is_cancelled(&event) || event.id.is_empty() {
                continue;
            }

            let id = event.id.clone();
            match ProviderEvent::from_google(event) {
                Ok(converted) => events.push(converted),
                Err(e) => warn!(event_id = %id, "Skipping Google event: {:#}", e),
            }
        }

        Ok(events)
    }

    async fn insert_event(&self, calendar_id: &str, event: &ProviderEvent) -> Result<ProviderEvent> {
        let google_event = event.to_google();

        let response = self
            .client
            .events()
            .insert(
                calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", event.summary))?;

        ProviderEvent::from_google(response.body)
    }
}

fn provider_error(e: anyhow::Error) -> LeadcalError {
    LeadcalError::Provider(format!("{:#}", e))
}

#[async_trait]
impl CalendarProvider for GoogleProvider {
    fn integration(&self) -> Integration {
        Integration::Google
    }

    #[instrument(skip(self))]
    async fn list_calendars(&self) -> LeadcalResult<Vec<ProviderCalendar>> {
        let calendars = self.fetch_calendars().await.map_err(provider_error)?;
        debug!(count = calendars.len(), "fetched Google calendars");
        Ok(calendars)
    }

    #[instrument(skip(self, range))]
    async fn list_events(
        &self,
        calendar_id: &str,
        range: &DateRange,
    ) -> LeadcalResult<Vec<ProviderEvent>> {
        let events = self
            .fetch_events(calendar_id, range)
            .await
            .map_err(provider_error)?;
        debug!(count = events.len(), "fetched Google events");
        Ok(events)
    }

    #[instrument(skip(self, event), fields(summary = %event.summary))]
    async fn create_event(
        &self,
        calendar_id: &str,
        event: &ProviderEvent,
    ) -> LeadcalResult<ProviderEvent> {
        self.insert_event(calendar_id, event)
            .await
            .map_err(provider_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;
    use google_calendar::types::{Event, EventDateTime};
    use leadcal_core::remote::normalize::from_provider;

    #[test]
    fn test_event_listing_expands_recurring_series() {
        assert!(EVENT_QUERY.single_events);
        assert!(!EVENT_QUERY.show_deleted);
    }

    #[test]
    fn test_expanded_occurrence_lands_on_its_own_day() {
        // A weekly series started on 2025-03-03; this is the 2025-03-17 instance
        let instance = Event {
            id: "series1_20250317T100000Z".to_string(),
            recurring_event_id: "series1".to_string(),
            summary: "Weekly sync".to_string(),
            start: Some(EventDateTime {
                date: None,
                date_time: Some(Utc.with_ymd_and_hms(2025, 3, 17, 10, 0, 0).unwrap()),
                time_zone: String::new(),
            }),
            end: Some(EventDateTime {
                date: None,
                date_time: Some(Utc.with_ymd_and_hms(2025, 3, 17, 10, 30, 0).unwrap()),
                time_zone: String::new(),
            }),
            ..Default::default()
        };

        let converted = ProviderEvent::from_google(instance).unwrap();
        let event = from_provider(converted, Integration::Google, "primary").unwrap();

        let tz = Tz::UTC;
        assert!(event.touches_day(NaiveDate::from_ymd_opt(2025, 3, 17).unwrap(), &tz));
        assert!(!event.touches_day(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(), &tz));
    }
}
