//! The CRM's own event store: the authoritative source of calendar events.

mod http;
pub mod protocol;

pub use http::HttpEventStore;

use async_trait::async_trait;

use crate::date_range::DateRange;
use crate::error::LeadcalResult;
use crate::event::{EventPatch, NewEvent};
use crate::integrations::IntegrationStatus;
use crate::local::protocol::StoredEvent;

/// Operations the aggregator needs from the local event store.
///
/// Implementations return raw rows; normalization happens in the aggregator
/// so both sources go through the same checks.
#[async_trait]
pub trait LocalEventStore: Send + Sync {
    async fn list_events(&self, range: &DateRange) -> LeadcalResult<Vec<StoredEvent>>;

    async fn create_event(&self, event: &NewEvent) -> LeadcalResult<StoredEvent>;

    async fn update_event(&self, id: &str, patch: &EventPatch) -> LeadcalResult<StoredEvent>;

    async fn delete_event(&self, id: &str) -> LeadcalResult<()>;
}

/// Source of the per-user integration registry.
#[async_trait]
pub trait IntegrationRegistry: Send + Sync {
    async fn integrations(&self) -> LeadcalResult<Vec<IntegrationStatus>>;
}
