use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use civitas_core::error::CoreError;

/// Seconds a client should wait before retrying after `data_unavailable`.
const RETRY_AFTER_SECONDS: u64 = 30;

/// Application-level errors that map directly to HTTP responses.
///
/// Every variant implements [`IntoResponse`] so Axum handlers can use
/// `Result<impl IntoResponse, AppError>` as their return type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPeriod(token) => AppError::InvalidPeriod(token),
            CoreError::DataUnavailable(cause) => AppError::DataUnavailable(format!("{cause:#}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field, retry_after_seconds) = match &self {
            AppError::InvalidPeriod(token) => (
                StatusCode::BAD_REQUEST,
                "invalid_period",
                format!("unrecognized period '{token}' (expected 7d, 14d, 30d, 90d or YYYY-MM)"),
                Some("period"),
                None,
            ),
            AppError::DataUnavailable(cause) => {
                tracing::warn!(cause = %cause, "Event store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "data_unavailable",
                    "Analytics data is temporarily unavailable".to_string(),
                    None,
                    Some(RETRY_AFTER_SECONDS),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                    None,
                    None,
                )
            }
        };

        let mut response = (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "field": field
                }
            })),
        )
            .into_response();

        if let Some(retry_after_seconds) = retry_after_seconds {
            if let Ok(value) = retry_after_seconds.to_string().parse() {
                response
                    .headers_mut()
                    .insert(axum::http::header::RETRY_AFTER, value);
            }
        }

        response
    }
}
