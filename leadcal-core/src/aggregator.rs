//! Merged view over local and remote calendar events.
//!
//! `CalendarAggregator` owns the current snapshot. Each `fetch_events` call
//! loads local events first, then (only when the provider integration is
//! connected) the provider's events, normalizes both and replaces the
//! snapshot wholesale. Remote trouble degrades to a local-only snapshot;
//! local trouble fails the fetch.
//!
//! Overlapping fetches are resolved with request tokens: every fetch takes
//! the next token and only the holder of the latest token may replace the
//! snapshot. `shutdown` stops any in-flight fetch from touching state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::constants::DEFAULT_SYNC_DAYS;
use crate::date_range::DateRange;
use crate::error::{LeadcalError, LeadcalResult};
use crate::event::{CalendarEvent, DataQualityIssue, EventPatch, NewEvent, SourceRef};
use crate::integrations::IntegrationContext;
use crate::local::LocalEventStore;
use crate::local::protocol::StoredEvent;
use crate::remote::normalize::{from_provider, to_provider};
use crate::remote::{CalendarProvider, primary_calendar};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum AggregatorState {
    Idle,
    Loading,
    Ready,
    Error(String),
}

impl AggregatorState {
    fn accepts_mutations(&self) -> LeadcalResult<()> {
        match self {
            AggregatorState::Ready | AggregatorState::Error(_) => Ok(()),
            AggregatorState::Idle => Err(LeadcalError::InvalidState("no events loaded yet".into())),
            AggregatorState::Loading => {
                Err(LeadcalError::InvalidState("events are still loading".into()))
            }
        }
    }
}

/// What happened to the remote side of the last applied fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RemoteStatus {
    /// No provider configured, or its integration is not connected.
    #[default]
    Disconnected,
    Included,
    /// The provider failed; the snapshot holds local events only.
    Failed(String),
}

/// Result of a `fetch_events` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Applied,
    /// A newer fetch was issued while this one was running.
    Stale,
    /// The aggregator was shut down while this fetch was running.
    Shutdown,
}

/// What happened to the provider copy of a newly created event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    NotRequested,
    /// Sync was requested but no connected provider is available.
    Unavailable,
    Synced {
        provider_event_id: String,
    },
    /// The local event exists; its provider copy could not be completed.
    Failed {
        reason: String,
        provider_event_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOutcome {
    pub event: CalendarEvent,
    pub sync: SyncOutcome,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    events: Vec<CalendarEvent>,
    issues: Vec<DataQualityIssue>,
    range: Option<DateRange>,
    remote: RemoteStatus,
}

struct Inner {
    state: AggregatorState,
    snapshot: Snapshot,
}

struct RemoteBatch {
    events: Vec<CalendarEvent>,
    issues: Vec<DataQualityIssue>,
}

pub struct CalendarAggregator {
    local: Arc<dyn LocalEventStore>,
    provider: Option<Arc<dyn CalendarProvider>>,
    integrations: IntegrationContext,
    timezone: Tz,
    /// Days fetched each way around now when no range has been fetched yet.
    sync_days: i64,
    latest_token: AtomicU64,
    alive: AtomicBool,
    inner: RwLock<Inner>,
}

impl CalendarAggregator {
    pub fn new(
        local: Arc<dyn LocalEventStore>,
        provider: Option<Arc<dyn CalendarProvider>>,
        integrations: IntegrationContext,
        timezone: Tz,
    ) -> Self {
        CalendarAggregator {
            local,
            provider,
            integrations,
            timezone,
            sync_days: DEFAULT_SYNC_DAYS,
            latest_token: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            inner: RwLock::new(Inner {
                state: AggregatorState::Idle,
                snapshot: Snapshot::default(),
            }),
        }
    }

    /// Override the default fetch window of `DEFAULT_SYNC_DAYS` each way.
    pub fn with_sync_days(mut self, days: i64) -> Self {
        self.sync_days = days;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Stop in-flight fetches from mutating state. Used on teardown.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Run `f` on the state if the aggregator is alive and `token` is the
    /// latest issued token. Returns whether it ran.
    fn apply_if_current(&self, token: u64, f: impl FnOnce(&mut Inner)) -> bool {
        // Checked under the write lock so a newer fetch can't slip in between
        let mut inner = self.write();
        if !self.is_alive() || self.latest_token.load(Ordering::SeqCst) != token {
            return false;
        }
        f(&mut inner);
        true
    }

    fn discarded(&self) -> FetchStatus {
        if self.is_alive() {
            FetchStatus::Stale
        } else {
            FetchStatus::Shutdown
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn state(&self) -> AggregatorState {
        self.read().state.clone()
    }

    pub fn remote_status(&self) -> RemoteStatus {
        self.read().snapshot.remote.clone()
    }

    /// Copy of every event in the snapshot, local events first.
    pub fn events(&self) -> Vec<CalendarEvent> {
        self.read().snapshot.events.clone()
    }

    /// Records left out of the snapshot because their data is inconsistent.
    pub fn issues(&self) -> Vec<DataQualityIssue> {
        self.read().snapshot.issues.clone()
    }

    fn find_event(&self, id: &str) -> Option<CalendarEvent> {
        self.read().snapshot.events.iter().find(|e| e.id == id).cloned()
    }

    /// Events that start on, end on, or span across `date`, sorted by start.
    pub fn events_for_date(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        self.filtered(|e| e.touches_day(date, &self.timezone))
    }

    /// Events touching any day of the inclusive range, sorted by start.
    pub fn events_for_date_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<CalendarEvent> {
        self.filtered(|e| e.touches_range(from, to, &self.timezone))
    }

    fn filtered(&self, keep: impl Fn(&CalendarEvent) -> bool) -> Vec<CalendarEvent> {
        let mut events: Vec<CalendarEvent> = self
            .read()
            .snapshot
            .events
            .iter()
            .filter(|e| keep(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start.start_instant_in(&self.timezone));
        events
    }

    /// Load local and (if connected) remote events for `range` and replace
    /// the snapshot. Without a range, the last fetched range is reused, or
    /// the default window on the first fetch.
    #[instrument(skip(self, range))]
    pub async fn fetch_events(&self, range: Option<DateRange>) -> LeadcalResult<FetchStatus> {
        let token = self.latest_token.fetch_add(1, Ordering::SeqCst) + 1;
        let range = range
            .or_else(|| self.read().snapshot.range.clone())
            .unwrap_or_else(|| DateRange::around(Utc::now(), self.sync_days));

        self.apply_if_current(token, |inner| inner.state = AggregatorState::Loading);

        let rows = match self.local.list_events(&range).await {
            Ok(rows) => rows,
            Err(e) => {
                let message = e.to_string();
                if self.apply_if_current(token, |inner| inner.state = AggregatorState::Error(message)) {
                    return Err(e);
                }
                debug!(token, error = %e, "ignoring failure of superseded fetch");
                return Ok(self.discarded());
            }
        };

        if !self.apply_if_current(token, |_| ()) {
            debug!(token, "fetch superseded before remote step");
            return Ok(self.discarded());
        }

        let (mut events, mut issues) = normalize_local(rows);
        let remote = match self.fetch_remote(&range).await {
            Ok(Some(batch)) => {
                events.extend(batch.events);
                issues.extend(batch.issues);
                RemoteStatus::Included
            }
            Ok(None) => RemoteStatus::Disconnected,
            Err(e) => {
                warn!(error = %e, "remote calendar fetch failed; showing local events only");
                RemoteStatus::Failed(e.to_string())
            }
        };

        for issue in &issues {
            warn!(%issue, "skipping inconsistent calendar event");
        }

        let count = events.len();
        let applied = self.apply_if_current(token, |inner| {
            inner.snapshot = Snapshot {
                events,
                issues,
                range: Some(range),
                remote,
            };
            inner.state = AggregatorState::Ready;
        });

        if applied {
            info!(token, count, "calendar snapshot replaced");
            Ok(FetchStatus::Applied)
        } else {
            debug!(token, "discarding stale fetch result");
            Ok(self.discarded())
        }
    }

    /// `Ok(None)` when there is no connected provider; nothing is called then.
    async fn fetch_remote(&self, range: &DateRange) -> LeadcalResult<Option<RemoteBatch>> {
        let Some(provider) = self.connected_provider() else {
            return Ok(None);
        };

        let calendars = provider.list_calendars().await?;
        let calendar = primary_calendar(&calendars).ok_or_else(|| {
            LeadcalError::Provider(format!("no {} calendars found", provider.integration()))
        })?;

        let provider_events = provider.list_events(&calendar.id, range).await?;
        debug!(count = provider_events.len(), calendar = %calendar.id, "fetched remote events");

        let mut batch = RemoteBatch {
            events: Vec::with_capacity(provider_events.len()),
            issues: Vec::new(),
        };
        for event in provider_events {
            match from_provider(event, provider.integration(), &calendar.id) {
                Ok(event) => batch.events.push(event),
                Err(issue) => batch.issues.push(issue),
            }
        }
        Ok(Some(batch))
    }

    fn connected_provider(&self) -> Option<&Arc<dyn CalendarProvider>> {
        let provider = self.provider.as_ref()?;
        if self.integrations.is_connected(provider.integration()) {
            Some(provider)
        } else {
            debug!(integration = %provider.integration(), "integration not connected; skipping remote");
            None
        }
    }

    /// Refetch the current range after a mutation. Failures are recorded in
    /// the state by `fetch_events`; the mutation itself already succeeded.
    async fn refresh(&self) {
        if let Err(e) = self.fetch_events(None).await {
            warn!(error = %e, "refresh after mutation failed");
        }
    }

    /// Create an event in the local store, optionally pushing a copy to the
    /// connected provider. Provider trouble never undoes the local event.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_event(
        &self,
        input: NewEvent,
        sync_to_provider: bool,
    ) -> LeadcalResult<CreateOutcome> {
        input.validate()?;
        self.read().state.accepts_mutations()?;

        let stored = self.local.create_event(&input).await?;
        let event = normalize_created(stored)?;

        let sync = if sync_to_provider {
            self.sync_created(&event, &input).await
        } else {
            SyncOutcome::NotRequested
        };

        self.refresh().await;
        Ok(CreateOutcome { event, sync })
    }

    async fn sync_created(&self, event: &CalendarEvent, input: &NewEvent) -> SyncOutcome {
        let Some(provider) = self.connected_provider() else {
            return SyncOutcome::Unavailable;
        };

        let calendar_id = match provider.list_calendars().await {
            Ok(calendars) => match primary_calendar(&calendars) {
                Some(calendar) => calendar.id.clone(),
                None => return sync_failed("no calendar to create the event on".into(), None),
            },
            Err(e) => return sync_failed(e.to_string(), None),
        };

        let created = match provider.create_event(&calendar_id, &to_provider(input)).await {
            Ok(created) => created,
            Err(e) => return sync_failed(e.to_string(), None),
        };

        let patch = EventPatch::link_provider_event(&created.id);
        match self.local.update_event(local_id(event), &patch).await {
            Ok(_) => SyncOutcome::Synced {
                provider_event_id: created.id,
            },
            Err(e) => sync_failed(format!("could not link provider event: {}", e), Some(created.id)),
        }
    }

    /// Update a local event. Provider events are read-only here.
    #[instrument(skip(self, patch))]
    pub async fn update_event(&self, id: &str, patch: EventPatch) -> LeadcalResult<CalendarEvent> {
        self.read().state.accepts_mutations()?;
        if patch.is_empty() {
            return Err(LeadcalError::Validation("nothing to update".into()));
        }

        let current = self.find_event(id);
        let target = self.local_target(id, current.as_ref())?;
        patch.validate(current.as_ref())?;

        let stored = self.local.update_event(&target, &patch).await?;
        let event = normalize_created(stored)?;

        self.refresh().await;
        Ok(event)
    }

    /// Delete a local event. Provider events are read-only here.
    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: &str) -> LeadcalResult<()> {
        self.read().state.accepts_mutations()?;

        let current = self.find_event(id);
        let target = self.local_target(id, current.as_ref())?;

        self.local.delete_event(&target).await?;

        self.refresh().await;
        Ok(())
    }

    /// Local store id for a mutation, decided by the event's source.
    /// Ids not in the snapshot are passed through to the local store.
    fn local_target(&self, id: &str, current: Option<&CalendarEvent>) -> LeadcalResult<String> {
        match current.map(|e| &e.source_ref) {
            Some(SourceRef::Remote { .. }) => Err(LeadcalError::ReadOnlyEvent(id.to_string())),
            Some(SourceRef::Local { local_id }) => Ok(local_id.clone()),
            None => Ok(id.to_string()),
        }
    }
}

fn local_id(event: &CalendarEvent) -> &str {
    match &event.source_ref {
        SourceRef::Local { local_id } => local_id,
        SourceRef::Remote { .. } => &event.id,
    }
}

fn sync_failed(reason: String, provider_event_id: Option<String>) -> SyncOutcome {
    warn!(%reason, "event saved locally but provider sync failed");
    SyncOutcome::Failed {
        reason,
        provider_event_id,
    }
}

fn normalize_local(rows: Vec<StoredEvent>) -> (Vec<CalendarEvent>, Vec<DataQualityIssue>) {
    let mut events = Vec::with_capacity(rows.len());
    let mut issues = Vec::new();
    for row in rows {
        match row.normalize() {
            Ok(event) => events.push(event),
            Err(issue) => issues.push(issue),
        }
    }
    (events, issues)
}

fn normalize_created(stored: StoredEvent) -> LeadcalResult<CalendarEvent> {
    stored
        .normalize()
        .map_err(|issue| LeadcalError::LocalStore(format!("store returned an invalid event: {}", issue)))
}
