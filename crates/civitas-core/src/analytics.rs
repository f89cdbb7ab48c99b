//! Dashboard read-model types.
//!
//! Everything here serialises with camelCase field names; the dashboard front
//! end consumes these shapes directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::DateRange;

/// One calendar day of traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub date: NaiveDate,
    /// Distinct visitors seen that day.
    pub visitors: u64,
    pub page_views: u64,
    /// Share of that day's sessions with exactly one page view, 0–100.
    pub bounce_rate: f64,
    /// Mean session duration in seconds (0.0 when there were no sessions).
    pub avg_session_duration: f64,
    pub new_users: u64,
}

impl DailyPoint {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            visitors: 0,
            page_views: 0,
            bounce_rate: 0.0,
            avg_session_duration: 0.0,
            new_users: 0,
        }
    }
}

/// Visitor share of one label within a dimension (source, device, country, page).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionShare {
    pub label: String,
    pub visitors: u64,
    /// Whole-number percentage of the full (untruncated) total.
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub path: String,
    pub title: String,
    pub page_views: u64,
    pub visitors: u64,
    /// Mean seconds per view.
    pub avg_time_on_page: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// Month name of the period's last day, e.g. "April".
    pub label: String,
    pub visitors: u64,
    pub page_views: u64,
    pub avg_session_duration: f64,
    pub bounce_rate: f64,
}

impl PeriodSummary {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            visitors: 0,
            page_views: 0,
            avg_session_duration: 0.0,
            bounce_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonDelta {
    pub metric_name: String,
    pub percent_change: i64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEngagement {
    pub event_id: String,
    pub title: String,
    pub status: String,
    pub views: u64,
    pub registrations: u64,
    /// registrations / views × 100, one decimal; 0.0 when there were no views.
    pub conversion_rate: f64,
    pub share_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_visitors: u64,
    pub total_page_views: u64,
    pub avg_bounce_rate: f64,
    pub avg_session_duration: f64,
    pub total_new_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparison {
    pub current: PeriodSummary,
    pub previous: PeriodSummary,
    pub changes: Vec<ComparisonDelta>,
}

/// The complete aggregated result for one period request.
///
/// Built fresh per request and never mutated afterwards. Every field is
/// always populated; an empty window yields zeros and empty lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub period: String,
    pub range: DateRange,
    pub summary: DashboardSummary,
    pub daily_data: Vec<DailyPoint>,
    pub traffic_sources: Vec<DimensionShare>,
    pub device_categories: Vec<DimensionShare>,
    pub geographic_data: Vec<DimensionShare>,
    pub top_pages: Vec<TopPage>,
    pub event_engagement: Vec<EventEngagement>,
    pub monthly_comparison: MonthlyComparison,
}
