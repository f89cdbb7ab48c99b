use crate::analytics::EventEngagement;
use crate::event::ProgramEventCounts;
use crate::numeric::{percent_of, round_to_tenth};

/// Registrations per view as a percentage with one decimal; 0.0 without views.
pub fn conversion_rate(views: u64, registrations: u64) -> f64 {
    round_to_tenth(percent_of(registrations, views))
}

/// One [`EventEngagement`] row per input row, in input order.
pub fn summarize_engagement(counts: &[ProgramEventCounts]) -> Vec<EventEngagement> {
    counts
        .iter()
        .map(|c| EventEngagement {
            event_id: c.event_id.clone(),
            title: c.title.clone(),
            status: c.status.clone(),
            views: c.views,
            registrations: c.registrations,
            conversion_rate: conversion_rate(c.views, c.registrations),
            share_count: c.share_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(id: &str, views: u64, registrations: u64) -> ProgramEventCounts {
        ProgramEventCounts {
            event_id: id.to_string(),
            title: format!("Diskusi Publik {id}"),
            status: "UPCOMING".to_string(),
            views,
            registrations,
            share_count: 3,
        }
    }

    #[test]
    fn conversion_rate_has_one_decimal() {
        assert_eq!(conversion_rate(200, 25), 12.5);
        assert_eq!(conversion_rate(3, 1), 33.3);
    }

    #[test]
    fn zero_views_yield_zero_rate() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(0, 4), 0.0);
    }

    #[test]
    fn no_event_is_dropped_and_order_is_kept() {
        let rows = summarize_engagement(&[counts("b", 0, 0), counts("a", 200, 25)]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].event_id, "b");
        assert_eq!(rows[0].conversion_rate, 0.0);
        assert_eq!(rows[1].conversion_rate, 12.5);
        assert_eq!(rows[1].share_count, 3);
    }
}
