//! Reporting-period resolution.
//!
//! A period token selects the current reporting window and the comparison
//! window that immediately precedes it. Resolution is pure: the same token,
//! `now` and timezone always produce the same ranges.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Recognised trailing-window tokens, shortest first.
pub const TRAILING_TOKENS: &[&str] = &["7d", "14d", "30d", "90d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Last7Days,
    Last14Days,
    Last30Days,
    Last90Days,
    /// A whole calendar month, written `YYYY-MM`.
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim() {
            "7d" => Ok(Self::Last7Days),
            "14d" => Ok(Self::Last14Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            other => parse_month(other).ok_or_else(|| CoreError::InvalidPeriod(raw.to_string())),
        }
    }

    /// Length of a trailing window in days; `None` for calendar months.
    pub fn trailing_days(&self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last14Days => Some(14),
            Self::Last30Days => Some(30),
            Self::Last90Days => Some(90),
            Self::Month { .. } => None,
        }
    }

    /// Canonical token, suitable as a cache key.
    pub fn token(&self) -> String {
        match self {
            Self::Month { year, month } => format!("{year:04}-{month:02}"),
            other => format!("{}d", other.trailing_days().unwrap_or_default()),
        }
    }
}

impl FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

fn parse_month(token: &str) -> Option<Period> {
    let (year_raw, month_raw) = token.split_once('-')?;
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if year_raw.len() != 4 || month_raw.len() != 2 || !all_digits(year_raw) || !all_digits(month_raw)
    {
        return None;
    }
    let year: i32 = year_raw.parse().ok()?;
    let month: u32 = month_raw.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(Period::Month { year, month })
}

/// An inclusive range of local calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of calendar days in the range (0 if `end` precedes `start`).
    pub fn days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(0)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the range, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.days() as usize)
    }

    /// Half-open UTC interval `[start 00:00, (end + 1) 00:00)` in `tz`.
    pub fn utc_bounds(&self, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            local_midnight_utc(self.start, tz),
            local_midnight_utc(self.end + Duration::days(1), tz),
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn local_midnight_utc(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump; the local day starts an hour later.
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Calendar day of `timestamp` in `tz`.
pub fn local_date(timestamp: DateTime<Utc>, tz: Tz) -> NaiveDate {
    timestamp.with_timezone(&tz).date_naive()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub period: Period,
    pub current: DateRange,
    pub previous: DateRange,
}

/// Resolve `period` against `now` in `tz`.
///
/// Trailing windows end today (inclusive) and the previous range has the same
/// length, ending the day before the current one starts. Calendar months
/// compare against the whole preceding calendar month.
pub fn resolve_period(
    period: Period,
    now: DateTime<Utc>,
    tz: Tz,
) -> Result<ResolvedPeriod, CoreError> {
    let invalid = || CoreError::InvalidPeriod(period.token());

    let (current, previous) = match period {
        Period::Month { year, month } => {
            let (start, end) = month_bounds(year, month).ok_or_else(invalid)?;
            let previous_end = start.pred_opt().ok_or_else(invalid)?;
            let previous_start = previous_end.with_day(1).ok_or_else(invalid)?;
            (
                DateRange::new(start, end),
                DateRange::new(previous_start, previous_end),
            )
        }
        trailing => {
            let days = trailing.trailing_days().ok_or_else(invalid)?;
            let today = local_date(now, tz);
            let start = today - Duration::days(days - 1);
            let previous_end = start - Duration::days(1);
            let previous_start = previous_end - Duration::days(days - 1);
            (
                DateRange::new(start, today),
                DateRange::new(previous_start, previous_end),
            )
        }
    };

    Ok(ResolvedPeriod {
        period,
        current,
        previous,
    })
}

/// Parse and resolve a raw token in one step.
pub fn resolve(token: &str, now: DateTime<Utc>, tz: Tz) -> Result<ResolvedPeriod, CoreError> {
    resolve_period(Period::parse(token)?, now, tz)
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noon_utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn seven_day_window_ends_today() {
        let resolved = resolve("7d", noon_utc(2026, 10, 19), chrono_tz::UTC).unwrap();
        assert_eq!(resolved.current, DateRange::new(date(2026, 10, 13), date(2026, 10, 19)));
        assert_eq!(resolved.previous, DateRange::new(date(2026, 10, 6), date(2026, 10, 12)));
    }

    #[test]
    fn previous_range_is_contiguous_and_equal_length_for_every_token() {
        let now = noon_utc(2024, 3, 1);
        for token in TRAILING_TOKENS {
            let resolved = resolve(token, now, chrono_tz::UTC).unwrap();
            assert_eq!(resolved.current.days(), resolved.previous.days(), "{token}");
            assert_eq!(
                resolved.previous.end + Duration::days(1),
                resolved.current.start,
                "{token}"
            );
            assert_eq!(
                Some(resolved.current.days()),
                resolved.period.trailing_days()
            );
        }
    }

    #[test]
    fn today_follows_the_configured_timezone() {
        // 20:00 UTC on the 19th is already the 20th in Jakarta (UTC+7).
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap();
        let resolved = resolve("7d", now, chrono_tz::Asia::Jakarta).unwrap();
        assert_eq!(resolved.current.end, date(2026, 10, 20));
    }

    #[test]
    fn calendar_month_compares_with_preceding_month() {
        let resolved = resolve("2025-03", noon_utc(2026, 1, 1), chrono_tz::UTC).unwrap();
        assert_eq!(resolved.current, DateRange::new(date(2025, 3, 1), date(2025, 3, 31)));
        assert_eq!(resolved.previous, DateRange::new(date(2025, 2, 1), date(2025, 2, 28)));

        let january = resolve("2025-01", noon_utc(2026, 1, 1), chrono_tz::UTC).unwrap();
        assert_eq!(january.previous, DateRange::new(date(2024, 12, 1), date(2024, 12, 31)));
    }

    #[test]
    fn unrecognised_tokens_are_rejected() {
        for token in ["", "0d", "1d", "7D", "30", "month", "2025-13", "2025-1", "+202-01"] {
            let err = Period::parse(token).unwrap_err();
            assert!(matches!(err, CoreError::InvalidPeriod(_)), "{token}");
        }
    }

    #[test]
    fn tokens_round_trip_through_display() {
        for token in ["7d", "14d", "30d", "90d", "2025-04"] {
            assert_eq!(Period::parse(token).unwrap().to_string(), token);
        }
        assert_eq!(Period::parse(" 30d ").unwrap(), Period::Last30Days);
    }

    #[test]
    fn utc_bounds_are_local_midnights() {
        let range = DateRange::new(date(2026, 10, 13), date(2026, 10, 19));
        let (start, end) = range.utc_bounds(chrono_tz::Asia::Jakarta);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 10, 12, 17, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 10, 19, 17, 0, 0).unwrap());
    }

    #[test]
    fn dates_cover_every_day() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 2));
        let days: Vec<_> = range.dates().collect();
        assert_eq!(days.len(), 5);
        assert_eq!(days[2], date(2024, 2, 29));
    }
}
