pub mod analyzer;
pub mod normalizer;
pub mod prompt;
pub mod providers;

pub use analyzer::ReportAnalyzer;
pub use normalizer::{normalize, MalformedReplyError};
pub use prompt::build_review_prompt;
