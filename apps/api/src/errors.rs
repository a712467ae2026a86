use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::analysis::InvalidReference;
use crate::pipeline::error::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<InvalidReference> for AppError {
    fn from(err: InvalidReference) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(e @ PipelineError::MissingInput { .. }) => {
                tracing::warn!("Pipeline input missing: {e}");
                (StatusCode::NOT_FOUND, "DOCUMENT_NOT_FOUND", e.to_string())
            }
            AppError::Pipeline(e) if e.is_timeout() => {
                tracing::error!("Pipeline stage timed out: {e}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "STAGE_TIMEOUT",
                    format!("The {} stage timed out", e.stage()),
                )
            }
            AppError::Pipeline(e) => {
                tracing::error!("Pipeline error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "STAGE_FAILED",
                    format!("The {} stage failed", e.stage()),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
