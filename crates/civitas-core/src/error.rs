use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The period token is not one of `7d`, `14d`, `30d`, `90d` or `YYYY-MM`.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// The event store reader failed. Carried verbatim, never retried here.
    #[error("data unavailable: {0}")]
    DataUnavailable(#[source] anyhow::Error),
}

impl CoreError {
    /// Stable machine-readable code used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidPeriod(_) => "invalid_period",
            CoreError::DataUnavailable(_) => "data_unavailable",
        }
    }
}
