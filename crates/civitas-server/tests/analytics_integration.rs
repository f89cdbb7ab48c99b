use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use civitas_core::{
    config::Config,
    event::{ProgramEventCounts, RawEvent},
    period::Period,
    store::{EventStoreReader, MemoryEventStore},
};
use civitas_duckdb::DuckDbBackend;
use civitas_server::app::build_app;
use civitas_server::state::{AppState, MAX_CACHED_SNAPSHOTS};

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

fn recent_visit(visitor: &str) -> RawEvent {
    RawEvent {
        timestamp: Utc::now() - chrono::Duration::minutes(5),
        visitor_id: visitor.to_string(),
        session_id: format!("s-{visitor}"),
        page_path: "/events/sekolah-demokrasi".to_string(),
        page_title: Some("Sekolah Demokrasi".to_string()),
        referrer_source: "Direct".to_string(),
        device_category: "Desktop".to_string(),
        country: "Indonesia".to_string(),
        duration_seconds: 90,
    }
}

async fn json_body(response: axum::http::Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("parse JSON")
}

async fn get(app: &Router, uri: &str) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    app.clone().oneshot(request).await.expect("request")
}

/// Reader that counts `fetch_events` calls and can be switched to failing.
struct FlakyStore {
    inner: MemoryEventStore,
    failing: AtomicBool,
    reads: AtomicUsize,
}

impl FlakyStore {
    fn new(events: Vec<RawEvent>) -> Self {
        Self {
            inner: MemoryEventStore::new(events, Vec::new()),
            failing: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EventStoreReader for FlakyStore {
    async fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawEvent>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("event store timed out");
        }
        self.inner.fetch_events(start, end).await
    }

    async fn fetch_event_counts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ProgramEventCounts>> {
        self.inner.fetch_event_counts(start, end).await
    }
}

fn app_with_store(store: Arc<FlakyStore>, config: Config) -> Router {
    let db = Arc::new(DuckDbBackend::open_in_memory().expect("in-memory DuckDB"));
    build_app(Arc::new(AppState::with_store(db, store, config)))
}

#[tokio::test]
async fn test_analytics_returns_snapshot_from_duckdb() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.insert_visits(&[recent_visit("v1"), recent_visit("v2")])
        .await
        .expect("insert");
    let app = build_app(Arc::new(AppState::new(db, test_config())));

    let response = get(&app, "/api/analytics?period=7d").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["period"], "7d");
    assert_eq!(json["dailyData"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["summary"]["totalPageViews"], 2);
    assert_eq!(json["trafficSources"][0]["label"], "Direct");
    assert_eq!(json["trafficSources"][0]["percentage"], 100);
    assert_eq!(json["topPages"][0]["path"], "/events/sekolah-demokrasi");
    assert!(json["eventEngagement"].is_array());
    assert_eq!(json["monthlyComparison"]["changes"][0]["metricName"], "visitors");
}

#[tokio::test]
async fn test_analytics_uses_default_period_when_missing() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let app = build_app(Arc::new(AppState::new(db, test_config())));

    let response = get(&app, "/api/analytics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["period"], "30d");
    assert_eq!(json["dailyData"].as_array().map(Vec::len), Some(30));
    assert_eq!(json["summary"]["totalVisitors"], 0);
}

#[tokio::test]
async fn test_analytics_month_period_covers_calendar_month() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let app = build_app(Arc::new(AppState::new(db, test_config())));

    let response = get(&app, "/api/analytics?period=2026-02").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["period"], "2026-02");
    assert_eq!(json["range"]["start"], "2026-02-01");
    assert_eq!(json["range"]["end"], "2026-02-28");
    assert_eq!(json["dailyData"].as_array().map(Vec::len), Some(28));
}

#[tokio::test]
async fn test_analytics_rejects_unknown_period() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let app = build_app(Arc::new(AppState::new(db, test_config())));

    let response = get(&app, "/api/analytics?period=yesterday").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "invalid_period");
    assert_eq!(json["error"]["field"], "period");
}

#[tokio::test]
async fn test_analytics_returns_503_when_store_fails_without_cache() {
    let store = Arc::new(FlakyStore::new(Vec::new()));
    store.failing.store(true, Ordering::SeqCst);
    let app = app_with_store(store, test_config());

    let response = get(&app, "/api/analytics?period=7d").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok()),
        Some("30")
    );

    let json = json_body(response).await;
    assert_eq!(json["error"]["code"], "data_unavailable");
}

#[tokio::test]
async fn test_analytics_serves_cached_snapshot_within_ttl() {
    let store = Arc::new(FlakyStore::new(vec![recent_visit("v1")]));
    let app = app_with_store(Arc::clone(&store), test_config());

    let first = get(&app, "/api/analytics?period=14d").await;
    assert_eq!(first.status(), StatusCode::OK);
    let second = get(&app, "/api/analytics?period=14d").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert!(second.headers().get("x-civitas-stale").is_none());

    // Current and previous range for the first request only.
    assert_eq!(store.reads.load(Ordering::SeqCst), 2);
    assert_eq!(json_body(second).await["summary"]["totalPageViews"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_analytics_falls_back_to_stale_snapshot() {
    let store = Arc::new(FlakyStore::new(vec![recent_visit("v1")]));
    let config = Config {
        cache_ttl_secs: 60,
        ..test_config()
    };
    let app = app_with_store(Arc::clone(&store), config);

    let fresh = get(&app, "/api/analytics?period=7d").await;
    assert_eq!(fresh.status(), StatusCode::OK);

    store.failing.store(true, Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(61)).await;

    let stale = get(&app, "/api/analytics?period=7d").await;
    assert_eq!(stale.status(), StatusCode::OK);
    assert_eq!(
        stale
            .headers()
            .get("x-civitas-stale")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    assert_eq!(json_body(stale).await["summary"]["totalPageViews"], 1);
}

#[tokio::test(start_paused = true)]
async fn test_analytics_stale_fallback_can_be_disabled() {
    let store = Arc::new(FlakyStore::new(vec![recent_visit("v1")]));
    let config = Config {
        cache_ttl_secs: 60,
        serve_stale: false,
        ..test_config()
    };
    let app = app_with_store(Arc::clone(&store), config);

    assert_eq!(get(&app, "/api/analytics?period=7d").await.status(), StatusCode::OK);

    store.failing.store(true, Ordering::SeqCst);
    tokio::time::advance(Duration::from_secs(61)).await;

    let response = get(&app, "/api/analytics?period=7d").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_analytics_cache_stays_bounded_across_many_months() {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    let state = Arc::new(AppState::new(db, test_config()));
    let app = build_app(Arc::clone(&state));

    for year in 2000..2010 {
        for month in 1..=12 {
            let uri = format!("/api/analytics?period={year}-{month:02}");
            assert_eq!(get(&app, &uri).await.status(), StatusCode::OK);
        }
    }

    assert_eq!(state.cached_snapshot_count().await, MAX_CACHED_SNAPSHOTS);
}
