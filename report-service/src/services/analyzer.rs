//! Report analysis: validate, prompt, call the model, normalize.

use std::sync::Arc;
use std::time::Instant;

use validator::Validate;

use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult};
use crate::services::normalizer::normalize;
use crate::services::prompt::build_review_prompt;
use crate::services::providers::{FinishReason, TextProvider};

/// Runs one analysis per request. Holds no per-request state, so a single
/// instance is shared by all handlers.
pub struct ReportAnalyzer {
    provider: Arc<dyn TextProvider>,
    model: String,
}

impl ReportAnalyzer {
    pub fn new(provider: Arc<dyn TextProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Analyze `request.text`.
    ///
    /// Blank text is rejected before the provider is touched. Provider
    /// failures and unrecoverable replies are logged here with their cause;
    /// callers only see the error kind.
    #[tracing::instrument(skip(self, request), fields(model = %self.model, text_len = request.text.len()))]
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        if request.validate().is_err() {
            tracing::debug!("Rejected blank report text");
            return Err(AnalysisError::Validation);
        }

        let prompt = build_review_prompt(&request.text);
        let started = Instant::now();

        let response = self
            .provider
            .generate(&prompt, &self.model)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    latency_ms = started.elapsed().as_millis() as u64,
                    "Gemini Error"
                );
                AnalysisError::Upstream(e)
            })?;

        tracing::info!(
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            finish_reason = ?response.finish_reason,
            latency_ms = started.elapsed().as_millis() as u64,
            "Model reply received"
        );

        if response.finish_reason == FinishReason::Length {
            tracing::warn!(
                output_tokens = response.output_tokens,
                reply_len = response.text.len(),
                "Model reply truncated at token limit"
            );
        }

        normalize(&response.text).map_err(|e| {
            tracing::warn!(
                error = %e,
                reply_len = response.text.len(),
                "Model reply could not be normalized"
            );
            AnalysisError::MalformedReply(e)
        })
    }
}
