//! Period-over-period percentage deltas.

use serde::{Deserialize, Serialize};

use crate::analytics::{ComparisonDelta, Direction, PeriodSummary};
use crate::numeric::round_half_up;

/// Which way a metric should move to count as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    /// e.g. bounce rate: the change is measured from `current` back to
    /// `previous`, so a drop shows as a positive number.
    LowerIsBetter,
}

/// Signed, rounded percentage change from `previous` to `current`.
///
/// For [`Polarity::LowerIsBetter`] the operands swap roles: the change is
/// `(previous - current) / current`, with `current` as the base.
pub fn percent_change(current: f64, previous: f64, polarity: Polarity) -> i64 {
    match polarity {
        Polarity::HigherIsBetter => relative_change(current, previous),
        Polarity::LowerIsBetter => relative_change(previous, current),
    }
}

/// A zero `base` has no ratio: the change is 100 when `value` is positive
/// ("new activity") and 0 otherwise.
fn relative_change(value: f64, base: f64) -> i64 {
    if base == 0.0 {
        if value > 0.0 {
            100
        } else {
            0
        }
    } else {
        round_half_up((value - base) / base * 100.0) as i64
    }
}

/// Zero counts as `Up`; the dashboard shows an unchanged metric with the
/// upward arrow.
pub fn direction_of(percent_change: i64) -> Direction {
    if percent_change >= 0 {
        Direction::Up
    } else {
        Direction::Down
    }
}

pub fn compare(metric_name: &str, current: f64, previous: f64, polarity: Polarity) -> ComparisonDelta {
    let percent_change = percent_change(current, previous, polarity);
    ComparisonDelta {
        metric_name: metric_name.to_string(),
        percent_change,
        direction: direction_of(percent_change),
    }
}

/// Deltas for every numeric field of [`PeriodSummary`], in display order.
pub fn compare_periods(current: &PeriodSummary, previous: &PeriodSummary) -> Vec<ComparisonDelta> {
    vec![
        compare(
            "visitors",
            current.visitors as f64,
            previous.visitors as f64,
            Polarity::HigherIsBetter,
        ),
        compare(
            "pageViews",
            current.page_views as f64,
            previous.page_views as f64,
            Polarity::HigherIsBetter,
        ),
        compare(
            "avgSessionDuration",
            current.avg_session_duration,
            previous.avg_session_duration,
            Polarity::HigherIsBetter,
        ),
        compare(
            "bounceRate",
            current.bounce_rate,
            previous.bounce_rate,
            Polarity::LowerIsBetter,
        ),
    ]
}
