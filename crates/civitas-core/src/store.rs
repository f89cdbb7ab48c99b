//! The event-store collaborator the dashboard reads from.

use chrono::{DateTime, Utc};

use crate::event::{ProgramEventCounts, RawEvent};

/// Read access to collected visits and program-event interactions.
///
/// Both methods take a half-open UTC window `[start, end)`. A window with no
/// data is an empty list, never an error; errors mean the store could not be
/// read at all (connectivity, corrupt file ...).
#[async_trait::async_trait]
pub trait EventStoreReader: Send + Sync + 'static {
    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawEvent>>;

    /// Every program event, with interactions counted inside the window.
    async fn fetch_event_counts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ProgramEventCounts>>;
}

/// Fixed in-memory store, for tests and fixtures.
///
/// Program-event counts are returned as given regardless of the window.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    events: Vec<RawEvent>,
    counts: Vec<ProgramEventCounts>,
}

impl MemoryEventStore {
    pub fn new(events: Vec<RawEvent>, counts: Vec<ProgramEventCounts>) -> Self {
        Self { events, counts }
    }
}

#[async_trait::async_trait]
impl EventStoreReader for MemoryEventStore {
    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| start <= e.timestamp && e.timestamp < end)
            .cloned()
            .collect())
    }

    async fn fetch_event_counts(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ProgramEventCounts>> {
        Ok(self.counts.clone())
    }
}
