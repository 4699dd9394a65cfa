//! JSON shapes exchanged with the CRM backend.

use serde::{Deserialize, Serialize};

use crate::error::{LeadcalError, LeadcalResult};
use crate::event::{
    CalendarEvent, DataQualityIssue, EventPatch, EventSource, EventStatus, EventTime, EventType,
    NewEvent, SourceRef, validate_span,
};

/// Every backend response is wrapped in this envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, turning `success: false` into a store error.
    pub fn into_data(self) -> LeadcalResult<Option<T>> {
        if self.success {
            Ok(self.data)
        } else {
            Err(LeadcalError::LocalStore(
                self.error.unwrap_or_else(|| "request failed".to_string()),
            ))
        }
    }

    /// Like `into_data`, but a successful response must carry a payload.
    pub fn into_required_data(self) -> LeadcalResult<T> {
        self.into_data()?
            .ok_or_else(|| LeadcalError::LocalStore("response has no data".into()))
    }
}

/// An event row as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default)]
    pub reminder_minutes: Option<i64>,
    #[serde(default)]
    pub lead_id: Option<String>,
    #[serde(default)]
    pub linked_provider_event_id: Option<String>,
}

impl StoredEvent {
    /// Normalize into the unified shape.
    ///
    /// Rows with a missing title, unparseable times or an end before their
    /// start come back as a `DataQualityIssue` rather than being repaired.
    pub fn normalize(self) -> Result<CalendarEvent, DataQualityIssue> {
        let issue = |reason: String| DataQualityIssue {
            source: EventSource::Local,
            record_id: self.id.clone(),
            reason,
        };

        if self.title.trim().is_empty() {
            return Err(issue("title is empty".to_string()));
        }

        let start = parse_stored_time(&self.start_time, self.all_day).map_err(|e| issue(e.to_string()))?;
        let end = self
            .end_time
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_stored_time(s, self.all_day))
            .transpose()
            .map_err(|e| issue(e.to_string()))?;
        validate_span(&start, end.as_ref()).map_err(|e| issue(e.to_string()))?;

        Ok(CalendarEvent {
            source_ref: SourceRef::Local {
                local_id: self.id.clone(),
            },
            id: self.id,
            title: self.title,
            description: self.description,
            start,
            end,
            event_type: self.event_type,
            status: self.status,
            location: self.location,
            attendees: self.attendees,
            reminder_minutes: self.reminder_minutes,
            lead_ref: self.lead_id,
            linked_provider_event_id: self.linked_provider_event_id,
        })
    }
}

/// All-day rows keep only the date, even when the backend sent a timestamp.
fn parse_stored_time(raw: &str, all_day: bool) -> LeadcalResult<EventTime> {
    let time: EventTime = raw.parse()?;
    Ok(match time {
        EventTime::DateTime(dt) if all_day => EventTime::Date(dt.date_naive()),
        other => other,
    })
}

fn format_stored_time(time: &EventTime) -> String {
    match time {
        EventTime::Date(d) => d.format("%Y-%m-%d").to_string(),
        EventTime::DateTime(dt) => dt.to_rfc3339(),
    }
}

/// Body of `POST /calendar/events`.
#[derive(Debug, Serialize)]
pub struct CreateEventBody {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub all_day: bool,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub attendees: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<String>,
}

impl From<&NewEvent> for CreateEventBody {
    fn from(event: &NewEvent) -> Self {
        CreateEventBody {
            title: event.title.trim().to_string(),
            description: event.description.clone(),
            start_time: format_stored_time(&event.start),
            end_time: event.end.as_ref().map(format_stored_time),
            all_day: event.start.is_date(),
            event_type: event.event_type,
            status: event.status,
            location: event.location.clone(),
            attendees: event.attendees.clone(),
            reminder_minutes: event.reminder_minutes,
            lead_id: event.lead_ref.clone(),
        }
    }
}

/// Body of `PATCH /calendar/events/{id}`. Only set fields are sent.
#[derive(Debug, Default, Serialize)]
pub struct PatchEventBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_provider_event_id: Option<String>,
}

impl From<&EventPatch> for PatchEventBody {
    fn from(patch: &EventPatch) -> Self {
        PatchEventBody {
            title: patch.title.as_ref().map(|t| t.trim().to_string()),
            description: patch.description.clone(),
            start_time: patch.start.as_ref().map(format_stored_time),
            end_time: patch.end.as_ref().map(format_stored_time),
            all_day: patch.start.as_ref().map(EventTime::is_date),
            event_type: patch.event_type,
            status: patch.status,
            location: patch.location.clone(),
            attendees: patch.attendees.clone(),
            reminder_minutes: patch.reminder_minutes,
            linked_provider_event_id: patch.linked_provider_event_id.clone(),
        }
    }
}
