//! CRM lead records, as handed to the event deriver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{CONTACT_MADE_STAGE, DEMO_SCHEDULED_STAGE};
use crate::event::EventTime;

/// Pipeline stage of a lead. Stages without calendar rules keep their tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum PipelineStage {
    ContactMade,
    DemoScheduled,
    Other(String),
}

impl From<&str> for PipelineStage {
    fn from(tag: &str) -> Self {
        match tag {
            CONTACT_MADE_STAGE => PipelineStage::ContactMade,
            DEMO_SCHEDULED_STAGE => PipelineStage::DemoScheduled,
            other => PipelineStage::Other(other.to_string()),
        }
    }
}

impl From<PipelineStage> for String {
    fn from(stage: PipelineStage) -> Self {
        match stage {
            PipelineStage::ContactMade => CONTACT_MADE_STAGE.to_string(),
            PipelineStage::DemoScheduled => DEMO_SCHEDULED_STAGE.to_string(),
            PipelineStage::Other(tag) => tag,
        }
    }
}

impl<'de> Deserialize<'de> for PipelineStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(PipelineStage::from(tag.as_str()))
    }
}

/// A lead/deal as stored by the CRM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub stage: PipelineStage,
    /// Date-only values stay all-day; anything with a time is an instant.
    #[serde(default, deserialize_with = "deserialize_event_time")]
    pub expected_close_date: Option<EventTime>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Lead {
    pub fn new(id: &str, name: &str, stage: &str) -> Self {
        Lead {
            id: id.to_string(),
            name: name.to_string(),
            company: None,
            stage: PipelineStage::from(stage),
            expected_close_date: None,
            created_at: None,
            location: None,
        }
    }
}

/// Lead dates arrive as `"2025-03-20"` or full timestamps; empty strings mean unset.
fn deserialize_event_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<EventTime>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
