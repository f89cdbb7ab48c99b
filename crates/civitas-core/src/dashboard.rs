//! Dashboard assembly: period → reads → aggregation → snapshot.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::analytics::{DashboardSnapshot, DashboardSummary, MonthlyComparison};
use crate::comparison::compare_periods;
use crate::dimension::{aggregate, top_n, top_pages, Dimension};
use crate::engagement::summarize_engagement;
use crate::error::CoreError;
use crate::event::{ProgramEventCounts, RawEvent};
use crate::period::{resolve, ResolvedPeriod};
use crate::series::{build_daily_series, summarize_period, visitor_ids};

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    /// Timezone that defines calendar days.
    pub timezone: Tz,
    pub top_pages: usize,
    pub top_countries: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            top_pages: 10,
            top_countries: 10,
        }
    }
}

/// Build the snapshot for a raw period token.
///
/// Fails with [`CoreError::InvalidPeriod`] before any read, or with
/// [`CoreError::DataUnavailable`] if the reader errors. No retries.
pub async fn build_dashboard<R>(
    reader: &R,
    token: &str,
    now: DateTime<Utc>,
    options: &DashboardOptions,
) -> Result<DashboardSnapshot, CoreError>
where
    R: crate::store::EventStoreReader + ?Sized,
{
    let resolved = resolve(token, now, options.timezone)?;
    build_for_period(reader, &resolved, options).await
}

pub async fn build_for_period<R>(
    reader: &R,
    resolved: &ResolvedPeriod,
    options: &DashboardOptions,
) -> Result<DashboardSnapshot, CoreError>
where
    R: crate::store::EventStoreReader + ?Sized,
{
    let (current_start, current_end) = resolved.current.utc_bounds(options.timezone);
    let (previous_start, previous_end) = resolved.previous.utc_bounds(options.timezone);

    let current_events = reader
        .fetch_events(current_start, current_end)
        .await
        .map_err(CoreError::DataUnavailable)?;
    let previous_events = reader
        .fetch_events(previous_start, previous_end)
        .await
        .map_err(CoreError::DataUnavailable)?;
    let program_counts = reader
        .fetch_event_counts(current_start, current_end)
        .await
        .map_err(CoreError::DataUnavailable)?;

    debug!(
        period = %resolved.period,
        current = %resolved.current,
        current_events = current_events.len(),
        previous_events = previous_events.len(),
        program_events = program_counts.len(),
        "Fetched dashboard inputs"
    );

    Ok(assemble(
        resolved,
        &current_events,
        &previous_events,
        &program_counts,
        options,
    ))
}

/// Pure composition of the aggregators over already-fetched inputs.
pub fn assemble(
    resolved: &ResolvedPeriod,
    current_events: &[RawEvent],
    previous_events: &[RawEvent],
    program_counts: &[ProgramEventCounts],
    options: &DashboardOptions,
) -> DashboardSnapshot {
    let tz = options.timezone;

    let daily_data = build_daily_series(
        &resolved.current,
        current_events,
        tz,
        &visitor_ids(previous_events),
    );
    let current = summarize_period(&resolved.current, current_events, tz);
    let previous = summarize_period(&resolved.previous, previous_events, tz);

    let summary = DashboardSummary {
        total_visitors: daily_data.iter().map(|d| d.visitors).sum(),
        total_page_views: daily_data.iter().map(|d| d.page_views).sum(),
        avg_bounce_rate: current.bounce_rate,
        avg_session_duration: current.avg_session_duration,
        total_new_users: daily_data.iter().map(|d| d.new_users).sum(),
    };

    DashboardSnapshot {
        period: resolved.period.token(),
        range: resolved.current,
        summary,
        daily_data,
        traffic_sources: aggregate(current_events, Dimension::TrafficSource),
        device_categories: aggregate(current_events, Dimension::DeviceCategory),
        geographic_data: top_n(
            aggregate(current_events, Dimension::Country),
            options.top_countries,
        ),
        top_pages: top_pages(current_events, options.top_pages),
        event_engagement: summarize_engagement(program_counts),
        monthly_comparison: MonthlyComparison {
            changes: compare_periods(&current, &previous),
            current,
            previous,
        },
    }
}
