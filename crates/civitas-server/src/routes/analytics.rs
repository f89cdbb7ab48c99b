use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use civitas_core::{
    dashboard::build_for_period,
    error::CoreError,
    period::{resolve_period, Period},
};

use crate::{
    error::AppError,
    state::{AppState, CacheLookup},
};

/// Set on responses served from an expired snapshot.
pub const STALE_HEADER: HeaderName = HeaderName::from_static("x-civitas-stale");

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub period: Option<String>,
}

/// `GET /api/analytics?period=7d|14d|30d|90d|YYYY-MM` - full dashboard snapshot.
///
/// A missing `period` falls back to `CIVITAS_DEFAULT_PERIOD`.
#[tracing::instrument(skip(state))]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Response, AppError> {
    let period = match query.period.as_deref() {
        Some(raw) => Period::parse(raw)?,
        None => state.config.default_period,
    };
    let token = period.token();
    let options = state.config.dashboard_options();
    let resolved = resolve_period(period, chrono::Utc::now(), options.timezone)?;

    let stale = match state.cached_snapshot(&token, &resolved.current).await {
        CacheLookup::Fresh(snapshot) => {
            tracing::debug!(period = %token, "Serving cached snapshot");
            return Ok(Json(snapshot).into_response());
        }
        CacheLookup::Expired(snapshot) => Some(snapshot),
        CacheLookup::Miss => None,
    };

    match build_for_period(state.store.as_ref(), &resolved, &options).await {
        Ok(snapshot) => {
            if state.config.cache_ttl_secs > 0 || state.config.serve_stale {
                state.store_snapshot(&token, snapshot.clone()).await;
            }
            Ok(Json(snapshot).into_response())
        }
        Err(CoreError::DataUnavailable(cause)) => {
            match stale.filter(|_| state.config.serve_stale) {
                Some(snapshot) => {
                    tracing::warn!(
                        period = %token,
                        error = %cause,
                        "Event store unavailable, serving stale snapshot"
                    );
                    let mut response = Json(snapshot).into_response();
                    response
                        .headers_mut()
                        .insert(STALE_HEADER, HeaderValue::from_static("true"));
                    Ok(response)
                }
                None => Err(CoreError::DataUnavailable(cause).into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}
