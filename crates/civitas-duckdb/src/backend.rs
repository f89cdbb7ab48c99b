use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use civitas_core::event::RawEvent;

use crate::queries::sql_timestamp;
use crate::schema::init_sql;

/// Kinds of program-event interaction counted for engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    View,
    Registration,
    Share,
}

impl InteractionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::View => "view",
            InteractionKind::Registration => "registration",
            InteractionKind::Share => "share",
        }
    }
}

/// DuckDB-backed event store.
///
/// DuckDB is single-writer, so the connection sits behind an async
/// `Arc<Mutex<_>>`; the struct is shared across Axum handlers through an `Arc`.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// `memory_limit` is a DuckDB size string such as `"1GB"` or `"512MB"`.
    pub fn open(path: &str, memory_limit: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(&init_sql(memory_limit))?;
        info!(
            "DuckDB opened at {} with memory_limit={}, threads=2",
            path, memory_limit
        );
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database. Data is discarded on drop.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&init_sql("1GB"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a batch of page views in a single transaction.
    ///
    /// Returns immediately (no-op) if `visits` is empty.
    pub async fn insert_visits(&self, visits: &[RawEvent]) -> Result<()> {
        if visits.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        for visit in visits {
            tx.execute(
                r#"INSERT INTO site_visits (
                    id, visitor_id, session_id, page_path, page_title,
                    referrer_source, device_category, country,
                    duration_seconds, occurred_at
                ) VALUES (
                    ?1, ?2, ?3, ?4, ?5,
                    ?6, ?7, ?8,
                    ?9, CAST(?10 AS TIMESTAMP)
                )"#,
                duckdb::params![
                    uuid::Uuid::new_v4().to_string(),
                    visit.visitor_id,
                    visit.session_id,
                    visit.page_path,
                    visit.page_title,
                    visit.referrer_source,
                    visit.device_category,
                    visit.country,
                    i64::try_from(visit.duration_seconds).unwrap_or(i64::MAX),
                    sql_timestamp(visit.timestamp),
                ],
            )?;
        }

        tx.commit()?;
        tracing::info!("Inserted {} site visits into DuckDB", visits.len());
        Ok(())
    }

    /// Insert or update a program event row.
    pub async fn upsert_program_event(
        &self,
        id: &str,
        title: &str,
        status: &str,
        start_date: NaiveDate,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO program_events (id, title, status, start_date)
               VALUES (?1, ?2, ?3, CAST(?4 AS DATE))
               ON CONFLICT (id) DO UPDATE SET
                   title = EXCLUDED.title,
                   status = EXCLUDED.status,
                   start_date = EXCLUDED.start_date"#,
            duckdb::params![id, title, status, start_date.format("%Y-%m-%d").to_string()],
        )?;
        Ok(())
    }

    pub async fn record_interaction(
        &self,
        event_id: &str,
        kind: InteractionKind,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO program_event_interactions (event_id, kind, occurred_at)
             VALUES (?1, ?2, CAST(?3 AS TIMESTAMP))",
            duckdb::params![event_id, kind.as_str(), sql_timestamp(at)],
        )?;
        Ok(())
    }

    /// Execute `SELECT 1` as a lightweight liveness check.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch("SELECT 1")?;
        Ok(())
    }

    /// Acquire the DuckDB connection lock for direct queries.
    ///
    /// Intended for integration tests that need to verify stored data.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
