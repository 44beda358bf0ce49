//! HTTP handlers for the report service.

pub mod analyze;
pub mod health;

pub use analyze::analyze_report;
pub use health::{health_check, not_found, readiness_check, root};
