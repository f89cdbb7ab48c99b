use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded page view on the public site.
///
/// Produced by the external collector and only ever read here. Mirrors the
/// `site_visits` table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub timestamp: DateTime<Utc>,
    pub visitor_id: String,
    pub session_id: String,
    pub page_path: String,
    /// Document title at collection time, when the collector captured one.
    #[serde(default)]
    pub page_title: Option<String>,
    pub referrer_source: String,
    pub device_category: String,
    pub country: String,
    /// Seconds spent on the page before the next view or exit.
    pub duration_seconds: u64,
}

/// Interaction counters for one program event (workshop, talk, festival ...)
/// within the reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramEventCounts {
    pub event_id: String,
    pub title: String,
    pub status: String,
    pub views: u64,
    pub registrations: u64,
    pub share_count: u64,
}
