use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    /// IANA name of the timezone that defines dashboard days.
    pub timezone: String,
    pub cached_snapshots: usize,
}

/// `GET /health`: 200 with `status: "ok"` while the event store answers a
/// ping, 503 with `status: "degraded"` otherwise.
#[tracing::instrument(skip(state))]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let (code, status) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, "Event store ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    let report = HealthReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        timezone: state.config.timezone.name().to_string(),
        cached_snapshots: state.cached_snapshot_count().await,
    };
    (code, Json(report))
}
