use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docchat_core::error::CoreError;
use serde_json::json;

use crate::service::ServiceError;

/// Application-level error type for HTTP handlers.
///
/// Every rejection renders as `{"detail": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `docchat_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A session operation failed.
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Configuration(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AppError::Service(err) => match err {
                ServiceError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
                }
                ServiceError::NoSession(key) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("session '{key}' not found"),
                ),
                ServiceError::Backend(e) => {
                    tracing::error!(error = %e, "Backend request failed");
                    (
                        StatusCode::BAD_GATEWAY,
                        "BACKEND_ERROR",
                        "The backend could not complete the request".to_string(),
                    )
                }
            },
        };

        let body = json!({
            "detail": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
