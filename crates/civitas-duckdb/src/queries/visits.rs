use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use civitas_core::event::RawEvent;

use crate::queries::sql_timestamp;
use crate::DuckDbBackend;

struct VisitRow {
    visitor_id: String,
    session_id: String,
    page_path: String,
    page_title: Option<String>,
    referrer_source: String,
    device_category: String,
    country: String,
    duration_seconds: i64,
    occurred_at_us: i64,
}

impl VisitRow {
    fn into_event(self) -> Result<RawEvent> {
        let timestamp = DateTime::<Utc>::from_timestamp_micros(self.occurred_at_us)
            .ok_or_else(|| anyhow!("visit timestamp out of range: {}", self.occurred_at_us))?;
        Ok(RawEvent {
            timestamp,
            visitor_id: self.visitor_id,
            session_id: self.session_id,
            page_path: self.page_path,
            page_title: self.page_title,
            referrer_source: self.referrer_source,
            device_category: self.device_category,
            country: self.country,
            duration_seconds: self.duration_seconds.max(0) as u64,
        })
    }
}

pub async fn fetch_visits_inner(
    db: &DuckDbBackend,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<RawEvent>> {
    let conn = db.conn.lock().await;

    let mut stmt = conn.prepare(
        r#"
        SELECT
            visitor_id,
            session_id,
            page_path,
            page_title,
            referrer_source,
            device_category,
            country,
            duration_seconds,
            epoch_us(occurred_at) AS occurred_at_us
        FROM site_visits
        WHERE occurred_at >= CAST(?1 AS TIMESTAMP)
          AND occurred_at < CAST(?2 AS TIMESTAMP)
        ORDER BY occurred_at, id
        "#,
    )?;

    let rows = stmt.query_map(
        duckdb::params![sql_timestamp(start), sql_timestamp(end)],
        |row| {
            Ok(VisitRow {
                visitor_id: row.get(0)?,
                session_id: row.get(1)?,
                page_path: row.get(2)?,
                page_title: row.get(3)?,
                referrer_source: row.get(4)?,
                device_category: row.get(5)?,
                country: row.get(6)?,
                duration_seconds: row.get(7)?,
                occurred_at_us: row.get(8)?,
            })
        },
    )?;

    let mut visits = Vec::new();
    for row in rows {
        visits.push(row?.into_event()?);
    }
    Ok(visits)
}

impl DuckDbBackend {
    /// Page views with `start <= occurred_at < end`, oldest first.
    pub async fn fetch_visits(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>> {
        fetch_visits_inner(self, start, end).await
    }
}
