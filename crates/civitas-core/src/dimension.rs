//! Visitor shares grouped by a dimension, and the ranked top-pages list.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analytics::{DimensionShare, TopPage};
use crate::event::RawEvent;
use crate::numeric::{mean, percent_of, round_half_up, round_to_tenth};

/// Label used for events with an empty dimension value.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    TrafficSource,
    DeviceCategory,
    Country,
    PagePath,
}

impl Dimension {
    pub fn label_of<'a>(&self, event: &'a RawEvent) -> &'a str {
        match self {
            Dimension::TrafficSource => &event.referrer_source,
            Dimension::DeviceCategory => &event.device_category,
            Dimension::Country => &event.country,
            Dimension::PagePath => &event.page_path,
        }
    }
}

/// Group `events` by `dimension`. See [`aggregate_by`].
pub fn aggregate(events: &[RawEvent], dimension: Dimension) -> Vec<DimensionShare> {
    aggregate_by(events, |event| dimension.label_of(event))
}

/// Group `events` by the label `selector` returns and count distinct visitors
/// per label.
///
/// The percentage denominator is the sum of per-label visitor counts, so the
/// rounded percentages always add up to 100 within one point per label. Rows
/// are ordered by visitors descending, then label ascending. No events means
/// no rows.
pub fn aggregate_by<'a, F>(events: &'a [RawEvent], selector: F) -> Vec<DimensionShare>
where
    F: Fn(&'a RawEvent) -> &'a str,
{
    let mut by_label: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
    for event in events {
        let label = selector(event).trim();
        let label = if label.is_empty() { UNKNOWN_LABEL } else { label };
        by_label
            .entry(label)
            .or_default()
            .insert(event.visitor_id.as_str());
    }

    let total: u64 = by_label.values().map(|v| v.len() as u64).sum();
    if total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<DimensionShare> = by_label
        .into_iter()
        .map(|(label, visitors)| {
            let visitors = visitors.len() as u64;
            DimensionShare {
                label: label.to_string(),
                visitors,
                percentage: round_half_up(percent_of(visitors, total)) as u32,
            }
        })
        .collect();

    shares.sort_by(|a, b| b.visitors.cmp(&a.visitors).then_with(|| a.label.cmp(&b.label)));
    shares
}

/// Keep the first `n` rows. Percentages are not re-normalised.
pub fn top_n(mut shares: Vec<DimensionShare>, n: usize) -> Vec<DimensionShare> {
    shares.truncate(n);
    shares
}

#[derive(Default)]
struct PageTally<'a> {
    views: u64,
    seconds: u64,
    visitors: HashSet<&'a str>,
    title: Option<(&'a RawEvent, &'a str)>,
}

/// Rank pages by views (descending, then path) and keep the first `limit`.
///
/// The title is the most recent non-empty `page_title` seen for the path,
/// falling back to the path itself.
pub fn top_pages(events: &[RawEvent], limit: usize) -> Vec<TopPage> {
    let mut pages: HashMap<&str, PageTally<'_>> = HashMap::new();
    for event in events {
        let tally = pages.entry(event.page_path.as_str()).or_default();
        tally.views += 1;
        tally.seconds += event.duration_seconds;
        tally.visitors.insert(event.visitor_id.as_str());

        if let Some(title) = event.page_title.as_deref().map(str::trim) {
            let newer = tally
                .title
                .map_or(true, |(seen, _)| event.timestamp >= seen.timestamp);
            if !title.is_empty() && newer {
                tally.title = Some((event, title));
            }
        }
    }

    let mut ranked: Vec<TopPage> = pages
        .into_iter()
        .map(|(path, tally)| TopPage {
            path: path.to_string(),
            title: tally
                .title
                .map(|(_, title)| title.to_string())
                .unwrap_or_else(|| path.to_string()),
            page_views: tally.views,
            visitors: tally.visitors.len() as u64,
            avg_time_on_page: round_to_tenth(mean(tally.seconds, tally.views)),
        })
        .collect();

    ranked.sort_by(|a, b| b.page_views.cmp(&a.page_views).then_with(|| a.path.cmp(&b.path)));
    ranked.truncate(limit);
    ranked
}
