use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::startup::AppState;

pub const ROOT_MESSAGE: &str = "Gemini AI backend running 🚀";

/// Plain-text liveness message.
pub async fn root() -> &'static str {
    ROOT_MESSAGE
}

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "report-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint for K8s readiness probes. Probes the model
/// provider.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.provider.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Model provider not ready");
        AppError::ServiceUnavailable
    })?;
    Ok(StatusCode::OK)
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Not found"))
}
