use async_trait::async_trait;
use chrono::{DateTime, Utc};

use civitas_core::event::{ProgramEventCounts, RawEvent};
use civitas_core::store::EventStoreReader;

use crate::DuckDbBackend;

#[async_trait]
impl EventStoreReader for DuckDbBackend {
    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawEvent>> {
        crate::queries::visits::fetch_visits_inner(self, start, end).await
    }

    async fn fetch_event_counts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ProgramEventCounts>> {
        crate::queries::engagement::fetch_program_counts_inner(self, start, end).await
    }
}
