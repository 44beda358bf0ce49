//! Analysis request and the guaranteed-shape analysis result.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Recommendation used whenever the model did not produce a usable one.
pub const FALLBACK_RECOMMENDATION: &str = "No recommendation generated.";

/// Body of `POST /analyzeReport`.
#[derive(Debug, Deserialize, Validate)]
pub struct AnalysisRequest {
    /// Report text to review. Missing is treated like empty.
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub text: String,
}

fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Text is required".into());
        return Err(err);
    }
    Ok(())
}

/// Normalized review returned to the caller. All three keys are always
/// present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Problems found in the report. Items are passed through as the model
    /// produced them.
    pub issues: Vec<Value>,

    /// Overall recommendation.
    pub recommendation: String,

    /// Suggestions for improving the report.
    pub guidance: Vec<Value>,
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            issues: Vec::new(),
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
            guidance: Vec::new(),
        }
    }
}
