//! Request and response models for report analysis.

pub mod analysis;

pub use analysis::{AnalysisRequest, AnalysisResult, FALLBACK_RECOMMENDATION};
