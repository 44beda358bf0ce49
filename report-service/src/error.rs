//! Failure modes of a report analysis and their HTTP mapping.

use axum::response::{IntoResponse, Response};
use service_core::error::AppError;
use thiserror::Error;

use crate::services::normalizer::MalformedReplyError;
use crate::services::providers::ProviderError;

/// Message returned for rejected input.
pub const VALIDATION_MESSAGE: &str = "Text is required";

/// Message returned for any upstream or reply failure.
pub const UPSTREAM_MESSAGE: &str = "AI analysis failed";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request text was missing or blank. The model was not called.
    #[error("Text is required")]
    Validation,

    /// The model call itself failed.
    #[error("model call failed: {0}")]
    Upstream(#[from] ProviderError),

    /// The model replied but no JSON object could be recovered.
    #[error("model reply could not be normalized: {0}")]
    MalformedReply(#[from] MalformedReplyError),
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Validation => AppError::BadRequest(anyhow::anyhow!(VALIDATION_MESSAGE)),
            AnalysisError::Upstream(_) | AnalysisError::MalformedReply(_) => {
                AppError::UpstreamError(UPSTREAM_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
