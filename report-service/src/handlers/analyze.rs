use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::startup::AppState;

/// `POST /analyzeReport`
///
/// A body that is not a JSON object with a string `text` is treated like a
/// missing `text`. Oversized bodies are rejected with 413.
pub async fn analyze_report(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!("Request body exceeds limit");
            return Err(AppError::PayloadTooLarge);
        }
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "Unusable request body");
            return Err(AnalysisError::Validation.into());
        }
    };

    let result = state.analyzer.analyze(&request).await?;
    Ok(Json(result))
}
