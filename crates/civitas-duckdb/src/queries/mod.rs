pub mod engagement;
pub mod visits;

use chrono::{DateTime, Utc};

/// Render a UTC instant the way DuckDB casts to `TIMESTAMP`.
pub(crate) fn sql_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
