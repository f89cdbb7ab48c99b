//! Day-by-day series and whole-period summaries.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::analytics::{DailyPoint, PeriodSummary};
use crate::event::RawEvent;
use crate::numeric::{mean, percent_of, round_to_tenth};
use crate::period::{local_date, DateRange};

#[derive(Debug, Default, Clone, Copy)]
struct SessionTally {
    page_views: u64,
    duration_seconds: u64,
}

/// Page views, visitors and sessions folded from a set of events.
#[derive(Debug, Default)]
struct Tally<'a> {
    visitors: HashSet<&'a str>,
    page_views: u64,
    sessions: HashMap<&'a str, SessionTally>,
}

impl<'a> Tally<'a> {
    fn add(&mut self, event: &'a RawEvent) {
        self.visitors.insert(event.visitor_id.as_str());
        self.page_views += 1;
        let session = self.sessions.entry(event.session_id.as_str()).or_default();
        session.page_views += 1;
        session.duration_seconds += event.duration_seconds;
    }

    fn bounce_rate(&self) -> f64 {
        let bounced = self
            .sessions
            .values()
            .filter(|session| session.page_views == 1)
            .count() as u64;
        round_to_tenth(percent_of(bounced, self.sessions.len() as u64))
    }

    fn avg_session_duration(&self) -> f64 {
        let total: u64 = self.sessions.values().map(|s| s.duration_seconds).sum();
        round_to_tenth(mean(total, self.sessions.len() as u64))
    }
}

/// Bucket `events` into one [`DailyPoint`] per day of `range`.
///
/// Days without events are present with zero values, and the output is in
/// ascending date order. Events whose local day (in `tz`) lies outside the
/// range are ignored. A visitor counts as a new user on the first day they
/// appear, unless they are in `prior_visitors`.
pub fn build_daily_series(
    range: &DateRange,
    events: &[RawEvent],
    tz: Tz,
    prior_visitors: &HashSet<String>,
) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, Tally<'_>> =
        range.dates().map(|date| (date, Tally::default())).collect();

    let mut out_of_range = 0usize;
    for event in events {
        match days.get_mut(&local_date(event.timestamp, tz)) {
            Some(tally) => tally.add(event),
            None => out_of_range += 1,
        }
    }
    if out_of_range > 0 {
        debug!(out_of_range, %range, "Ignored events outside the series range");
    }

    let mut first_seen: HashMap<&str, NaiveDate> = HashMap::new();
    for (date, tally) in &days {
        for visitor in &tally.visitors {
            first_seen.entry(visitor).or_insert(*date);
        }
    }

    days.iter()
        .map(|(date, tally)| {
            let new_users = tally
                .visitors
                .iter()
                .filter(|visitor| {
                    first_seen.get(*visitor) == Some(date) && !prior_visitors.contains(**visitor)
                })
                .count() as u64;

            DailyPoint {
                date: *date,
                visitors: tally.visitors.len() as u64,
                page_views: tally.page_views,
                bounce_rate: tally.bounce_rate(),
                avg_session_duration: tally.avg_session_duration(),
                new_users,
            }
        })
        .collect()
}

/// Whole-range totals; sessions are keyed across the range, not per day.
pub fn summarize_period(range: &DateRange, events: &[RawEvent], tz: Tz) -> PeriodSummary {
    let mut tally = Tally::default();
    for event in events
        .iter()
        .filter(|event| range.contains(local_date(event.timestamp, tz)))
    {
        tally.add(event);
    }

    PeriodSummary {
        label: period_label(range),
        visitors: tally.visitors.len() as u64,
        page_views: tally.page_views,
        avg_session_duration: tally.avg_session_duration(),
        bounce_rate: tally.bounce_rate(),
    }
}

/// English month name of the range's last day.
pub fn period_label(range: &DateRange) -> String {
    range.end.format("%B").to_string()
}

/// Distinct visitor ids in `events`.
pub fn visitor_ids(events: &[RawEvent]) -> HashSet<String> {
    events.iter().map(|e| e.visitor_id.clone()).collect()
}
