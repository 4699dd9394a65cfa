//! HTTP client for the CRM backend's calendar endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::constants::USER_ID_HEADER;
use crate::date_range::DateRange;
use crate::error::{LeadcalError, LeadcalResult};
use crate::event::{EventPatch, NewEvent};
use crate::integrations::IntegrationStatus;
use crate::local::protocol::{CreateEventBody, Envelope, PatchEventBody, StoredEvent};
use crate::local::{IntegrationRegistry, LocalEventStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Local event store backed by the CRM's JSON API.
pub struct HttpEventStore {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl HttpEventStore {
    pub fn new(base_url: &str, user_id: &str) -> LeadcalResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(HttpEventStore {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id: user_id.to_string(),
        })
    }

    fn events_url(&self) -> String {
        format!("{}/calendar/events", self.base_url)
    }

    /// The id goes in as a single percent-encoded path segment.
    fn event_url(&self, id: &str) -> LeadcalResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.events_url())
            .map_err(|e| LeadcalError::Config(format!("Invalid backend URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| LeadcalError::Config(format!("Invalid backend URL {}", self.base_url)))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: impl reqwest::IntoUrl) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(USER_ID_HEADER, &self.user_id)
    }
}

/// Read a response body as an envelope, mapping HTTP and envelope failures
/// to `LocalStore` errors.
async fn read_envelope<T: DeserializeOwned>(resp: reqwest::Response) -> LeadcalResult<Envelope<T>> {
    let status = resp.status();
    let body = resp.text().await?;

    match serde_json::from_str::<Envelope<T>>(&body) {
        Ok(envelope) if status.is_success() => Ok(envelope),
        Ok(envelope) => Err(LeadcalError::LocalStore(
            envelope.error.unwrap_or_else(|| format!("HTTP {}", status)),
        )),
        Err(e) if status.is_success() => Err(LeadcalError::Serialization(format!(
            "Failed to parse response: {}",
            e
        ))),
        Err(_) => Err(LeadcalError::LocalStore(format!("HTTP {}", status))),
    }
}

#[async_trait]
impl LocalEventStore for HttpEventStore {
    /// GET /calendar/events
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    async fn list_events(&self, range: &DateRange) -> LeadcalResult<Vec<StoredEvent>> {
        let resp = self
            .request(reqwest::Method::GET, self.events_url())
            .query(&[("from", range.from_rfc3339()), ("to", range.to_rfc3339())])
            .send()
            .await?;

        let events: Vec<StoredEvent> = read_envelope(resp).await?.into_data()?.unwrap_or_default();
        debug!(count = events.len(), "fetched local events");
        Ok(events)
    }

    /// POST /calendar/events
    #[instrument(skip(self, event), fields(title = %event.title))]
    async fn create_event(&self, event: &NewEvent) -> LeadcalResult<StoredEvent> {
        let resp = self
            .request(reqwest::Method::POST, self.events_url())
            .json(&CreateEventBody::from(event))
            .send()
            .await?;

        read_envelope(resp).await?.into_required_data()
    }

    /// PATCH /calendar/events/{id}
    #[instrument(skip(self, patch))]
    async fn update_event(&self, id: &str, patch: &EventPatch) -> LeadcalResult<StoredEvent> {
        let resp = self
            .request(reqwest::Method::PATCH, self.event_url(id)?)
            .json(&PatchEventBody::from(patch))
            .send()
            .await?;

        read_envelope(resp).await?.into_required_data()
    }

    /// DELETE /calendar/events/{id}
    #[instrument(skip(self))]
    async fn delete_event(&self, id: &str) -> LeadcalResult<()> {
        let resp = self
            .request(reqwest::Method::DELETE, self.event_url(id)?)
            .send()
            .await?;

        read_envelope::<serde_json::Value>(resp).await?.into_data()?;
        Ok(())
    }
}

#[async_trait]
impl IntegrationRegistry for HttpEventStore {
    /// GET /integrations
    async fn integrations(&self) -> LeadcalResult<Vec<IntegrationStatus>> {
        let resp = self
            .request(reqwest::Method::GET, format!("{}/integrations", self.base_url))
            .send()
            .await?;

        Ok(read_envelope(resp).await?.into_data()?.unwrap_or_default())
    }
}
