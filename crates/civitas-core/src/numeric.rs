//! Rounding and ratio helpers shared by the aggregators.
//!
//! Rounding is half-up (toward +infinity at exactly .5) everywhere, so
//! `-2.5` rounds to `-2` and `2.5` rounds to `3`.

pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub(crate) fn round_to_tenth(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// `part / whole * 100`, or `0.0` when `whole` is zero.
pub(crate) fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `total / count`, or `0.0` when `count` is zero.
pub(crate) fn mean(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
