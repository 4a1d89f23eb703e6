use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::quota::QuotaError;

/// Errors visible to signal consumers.
///
/// Short price history and provider outages are absorbed inside the engine
/// and never show up here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Daily signal limit reached ({limit} signals). Come back tomorrow!")]
    QuotaExceeded { count: u32, limit: u32 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Quota(#[from] QuotaError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Quota(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        let body = match &self {
            AppError::QuotaExceeded { count, limit } => json!({
                "status": "limit_reached",
                "message": message,
                "count": count,
                "limit": limit,
            }),
            _ => {
                tracing::error!("Request failed: {}", message);
                json!({
                    "status": "error",
                    "message": message,
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
