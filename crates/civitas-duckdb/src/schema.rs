/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `CIVITAS_DUCKDB_MEMORY`, default `"1GB"`). Always set explicitly:
/// the DuckDB default (80% of system RAM) is not acceptable for a server
/// process.
///
/// All timestamps are stored as UTC `TIMESTAMP` values.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- SITE VISITS (one row per page view)
-- ===========================================
CREATE TABLE IF NOT EXISTS site_visits (
    id                VARCHAR PRIMARY KEY,
    visitor_id        VARCHAR NOT NULL,
    session_id        VARCHAR NOT NULL,
    page_path         VARCHAR NOT NULL,
    page_title        VARCHAR,
    referrer_source   VARCHAR NOT NULL,           -- 'Direct', 'Organic Search', 'Social Media' ...
    device_category   VARCHAR NOT NULL,           -- 'Desktop', 'Mobile', 'Tablet'
    country           VARCHAR NOT NULL,
    duration_seconds  BIGINT NOT NULL DEFAULT 0,
    occurred_at       TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_site_visits_occurred_at ON site_visits(occurred_at);

-- ===========================================
-- PROGRAM EVENTS (workshops, public discussions ...)
-- ===========================================
CREATE TABLE IF NOT EXISTS program_events (
    id          VARCHAR PRIMARY KEY,
    title       VARCHAR NOT NULL,
    status      VARCHAR NOT NULL,                 -- 'UPCOMING', 'ONGOING', 'COMPLETED', 'CANCELLED'
    start_date  DATE NOT NULL
);

CREATE TABLE IF NOT EXISTS program_event_interactions (
    event_id     VARCHAR NOT NULL,
    kind         VARCHAR NOT NULL CHECK (kind IN ('view', 'registration', 'share')),
    occurred_at  TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_interactions_event ON program_event_interactions(event_id, occurred_at);
"#
    )
}
