use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Instant;

use civitas_core::{
    analytics::DashboardSnapshot, config::Config, period::DateRange, store::EventStoreReader,
};
use civitas_duckdb::DuckDbBackend;

/// Upper bound on cached snapshots. The oldest entry is evicted first.
pub const MAX_CACHED_SNAPSHOTS: usize = 64;

/// A snapshot plus the instant it was built.
#[derive(Debug, Clone)]
pub struct CachedSnapshot {
    pub built_at: Instant,
    pub snapshot: DashboardSnapshot,
}

/// Outcome of a cache lookup for one period token.
pub enum CacheLookup {
    Fresh(DashboardSnapshot),
    /// Past its TTL or built for another date range; kept for the stale fallback.
    Expired(DashboardSnapshot),
    Miss,
}

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// The DuckDB backend, used for health checks.
    pub db: Arc<DuckDbBackend>,

    /// Reader the dashboard is built from. The DuckDB backend in production.
    pub store: Arc<dyn EventStoreReader>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,

    /// Last snapshot built per canonical period token, at most
    /// [`MAX_CACHED_SNAPSHOTS`] entries.
    snapshots: Mutex<HashMap<String, CachedSnapshot>>,
}

impl AppState {
    /// Construct a new `AppState` reading dashboard data from `db`.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        let store: Arc<dyn EventStoreReader> = db.clone();
        Self::with_store(db, store, config)
    }

    /// Construct an `AppState` whose dashboard reads go to `store`.
    pub fn with_store(
        db: Arc<DuckDbBackend>,
        store: Arc<dyn EventStoreReader>,
        config: Config,
    ) -> Self {
        Self {
            db,
            store,
            config: Arc::new(config),
            snapshots: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `token`. An entry is fresh only within the TTL and when it
    /// covers `current`, so a trailing window rolls over at local midnight.
    pub async fn cached_snapshot(&self, token: &str, current: &DateRange) -> CacheLookup {
        let snapshots = self.snapshots.lock().await;
        match snapshots.get(token) {
            Some(entry)
                if entry.built_at.elapsed() < self.config.cache_ttl()
                    && entry.snapshot.range == *current =>
            {
                CacheLookup::Fresh(entry.snapshot.clone())
            }
            Some(entry) => CacheLookup::Expired(entry.snapshot.clone()),
            None => CacheLookup::Miss,
        }
    }

    pub async fn store_snapshot(&self, token: &str, snapshot: DashboardSnapshot) {
        let mut snapshots = self.snapshots.lock().await;
        if !snapshots.contains_key(token) && snapshots.len() >= MAX_CACHED_SNAPSHOTS {
            let oldest = snapshots
                .iter()
                .min_by_key(|(_, entry)| entry.built_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                snapshots.remove(&oldest);
            }
        }
        snapshots.insert(
            token.to_string(),
            CachedSnapshot {
                built_at: Instant::now(),
                snapshot,
            },
        );
    }

    pub async fn cached_snapshot_count(&self) -> usize {
        self.snapshots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use civitas_core::{
        dashboard::{build_dashboard, DashboardOptions},
        period::Period,
        store::MemoryEventStore,
    };

    fn test_config() -> Config {
        Config {
            port: 0,
            data_dir: "/tmp/civitas-test".to_string(),
            duckdb_memory_limit: "256MB".to_string(),
            timezone: "UTC".parse().expect("timezone"),
            default_period: Period::Last30Days,
            cache_ttl_secs: 300,
            serve_stale: true,
            top_pages: 10,
            top_countries: 10,
            cors_origins: vec![],
        }
    }

    async fn snapshot_at(day: u32) -> DashboardSnapshot {
        let now = Utc.with_ymd_and_hms(2026, 4, day, 23, 59, 0).unwrap();
        build_dashboard(&MemoryEventStore::default(), "7d", now, &DashboardOptions::default())
            .await
            .expect("snapshot")
    }

    fn state() -> AppState {
        let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
        AppState::new(db, test_config())
    }

    #[tokio::test]
    async fn snapshot_for_previous_day_is_not_fresh() {
        let state = state();
        let yesterday = snapshot_at(6).await;
        let today = snapshot_at(7).await;
        state.store_snapshot("7d", yesterday.clone()).await;

        assert!(matches!(
            state.cached_snapshot("7d", &yesterday.range).await,
            CacheLookup::Fresh(_)
        ));
        match state.cached_snapshot("7d", &today.range).await {
            CacheLookup::Expired(stale) => assert_eq!(stale.range, yesterday.range),
            _ => panic!("expected an expired entry after the range rolled over"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn oldest_snapshot_is_evicted_at_capacity() {
        let state = state();
        let snapshot = snapshot_at(7).await;
        for i in 0..MAX_CACHED_SNAPSHOTS + 5 {
            state
                .store_snapshot(&format!("token-{i}"), snapshot.clone())
                .await;
            tokio::time::advance(std::time::Duration::from_millis(1)).await;
        }

        assert_eq!(state.cached_snapshot_count().await, MAX_CACHED_SNAPSHOTS);
        assert!(matches!(
            state.cached_snapshot("token-0", &snapshot.range).await,
            CacheLookup::Miss
        ));
        let newest = format!("token-{}", MAX_CACHED_SNAPSHOTS + 4);
        assert!(matches!(
            state.cached_snapshot(&newest, &snapshot.range).await,
            CacheLookup::Fresh(_)
        ));
    }
}
