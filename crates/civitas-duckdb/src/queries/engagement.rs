use anyhow::Result;
use chrono::{DateTime, Utc};

use civitas_core::event::ProgramEventCounts;

use crate::queries::sql_timestamp;
use crate::DuckDbBackend;

/// Every program event with its view/registration/share counts inside
/// `[start, end)`, newest start date first.
///
/// The window is applied in the join condition, not in `WHERE`, so events
/// without interactions in the window still come back with zero counts.
pub async fn fetch_program_counts_inner(
    db: &DuckDbBackend,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ProgramEventCounts>> {
    let conn = db.conn.lock().await;

    let mut stmt = conn.prepare(
        r#"
        WITH windowed AS (
            SELECT event_id, kind
            FROM program_event_interactions
            WHERE occurred_at >= CAST(?1 AS TIMESTAMP)
              AND occurred_at < CAST(?2 AS TIMESTAMP)
        )
        SELECT
            p.id,
            p.title,
            p.status,
            COUNT(w.event_id) FILTER (WHERE w.kind = 'view') AS views,
            COUNT(w.event_id) FILTER (WHERE w.kind = 'registration') AS registrations,
            COUNT(w.event_id) FILTER (WHERE w.kind = 'share') AS shares
        FROM program_events p
        LEFT JOIN windowed w ON w.event_id = p.id
        GROUP BY p.id, p.title, p.status, p.start_date
        ORDER BY p.start_date DESC, p.id
        "#,
    )?;

    let rows = stmt.query_map(
        duckdb::params![sql_timestamp(start), sql_timestamp(end)],
        |row| {
            let views: i64 = row.get(3)?;
            let registrations: i64 = row.get(4)?;
            let shares: i64 = row.get(5)?;
            Ok(ProgramEventCounts {
                event_id: row.get(0)?,
                title: row.get(1)?,
                status: row.get(2)?,
                views: views.max(0) as u64,
                registrations: registrations.max(0) as u64,
                share_count: shares.max(0) as u64,
            })
        },
    )?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl DuckDbBackend {
    pub async fn fetch_program_counts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProgramEventCounts>> {
        fetch_program_counts_inner(self, start, end).await
    }
}
