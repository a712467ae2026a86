//! Axum route handler for the analysis entry point.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisResult, DocumentReference};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Falls back to the configured default bucket.
    pub bucket: Option<String>,
    pub key: String,
}

/// POST /api/v1/analyze
///
/// Runs fetch → extract → {recognize, generate} for one stored document and
/// returns `{resume_text, skills, feedback}`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = payload?;

    let bucket = request
        .bucket
        .filter(|b| !b.trim().is_empty())
        .or_else(|| state.config.default_bucket.clone())
        .ok_or_else(|| {
            AppError::Validation("bucket is required when no S3_BUCKET default is set".to_string())
        })?;
    let reference = DocumentReference::new(bucket, request.key)?;

    let result = state.pipeline.analyze(&reference).await?;
    Ok(Json(result))
}
