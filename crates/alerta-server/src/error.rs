//! Maps `EngineError` (and this crate's own request-validation failures)
//! onto HTTP responses (§7 "Error Handling Design" propagation policy:
//! input errors -> 400, everything else this crate originates -> 500).
//!
//! Grounded on `other_examples/.../ssrf.rs`'s `AppError` (a small enum
//! implementing `IntoResponse`, one variant per HTTP status class).

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    TooManyRequests { retry_after_secs: u64 },
    Internal(String),
}

impl From<alerta_core::EngineError> for AppError {
    fn from(e: alerta_core::EngineError) -> Self {
        match e {
            alerta_core::EngineError::InvalidUrl(msg) => AppError::BadRequest(msg),
            alerta_core::EngineError::BlockedTarget(msg) => AppError::BadRequest(msg),
            alerta_core::EngineError::Storage(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": msg}))).into_response()
            }
            AppError::TooManyRequests { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": "rate limit exceeded", "retry_after_secs": retry_after_secs})),
                )
                    .into_response();
                if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                    response.headers_mut().insert("Retry-After", value);
                }
                response
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "internal server error"}))).into_response()
            }
        }
    }
}
