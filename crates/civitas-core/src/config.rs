use std::time::Duration;

use chrono_tz::Tz;

use crate::dashboard::DashboardOptions;
use crate::period::Period;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    pub duckdb_memory_limit: String,
    /// IANA timezone that defines the dashboard's calendar days.
    pub timezone: Tz,
    /// Period used when a request carries no `period` parameter.
    pub default_period: Period,
    /// Snapshot cache lifetime; 0 disables caching.
    pub cache_ttl_secs: u64,
    /// Serve an expired cached snapshot when the event store is unreachable.
    pub serve_stale: bool,
    pub top_pages: usize,
    pub top_countries: usize,
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("CIVITAS_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("CIVITAS_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("CIVITAS_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            timezone: {
                let raw = std::env::var("CIVITAS_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
                raw.parse::<Tz>()
                    .map_err(|_| format!("invalid CIVITAS_TIMEZONE: {raw}"))?
            },
            default_period: {
                let raw =
                    std::env::var("CIVITAS_DEFAULT_PERIOD").unwrap_or_else(|_| "30d".to_string());
                Period::parse(&raw).map_err(|e| format!("invalid CIVITAS_DEFAULT_PERIOD: {e}"))?
            },
            cache_ttl_secs: std::env::var("CIVITAS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
            serve_stale: std::env::var("CIVITAS_SERVE_STALE")
                .map(|v| v != "false")
                .unwrap_or(true),
            top_pages: std::env::var("CIVITAS_TOP_PAGES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            top_countries: std::env::var("CIVITAS_TOP_COUNTRIES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            cors_origins: std::env::var("CIVITAS_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            timezone: self.timezone,
            top_pages: self.top_pages,
            top_countries: self.top_countries,
        }
    }
}
