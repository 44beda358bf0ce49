//! Turns a free-form model reply into an [`AnalysisResult`].
//!
//! The reply may wrap the JSON object in prose or code fences, and the object
//! itself may miss fields or carry wrong types. Locating the object is the
//! only step that can fail; every field is then defaulted independently.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{AnalysisResult, FALLBACK_RECOMMENDATION};

/// Upper bound on `{` positions tried by the scanner.
const MAX_SCAN_CANDIDATES: usize = 64;

/// The model replied, but no JSON object could be recovered from it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedReplyError {
    #[error("reply contains no '{{' ... '}}' span")]
    NoObject,

    #[error("reply JSON could not be parsed: {0}")]
    InvalidJson(String),
}

/// Normalize a raw model reply.
pub fn normalize(raw: &str) -> Result<AnalysisResult, MalformedReplyError> {
    let mut object = extract_object(raw)?;

    Ok(AnalysisResult {
        issues: take_sequence(&mut object, "issues"),
        recommendation: take_recommendation(&mut object),
        guidance: take_sequence(&mut object, "guidance"),
    })
}

/// Find the JSON object embedded in `raw`.
///
/// Tries each `{` in order with an incremental parser, so braces inside
/// string values or a second object later in the reply do not matter. A `{`
/// inside the span of a candidate that failed to parse is never tried, so a
/// broken or truncated object cannot yield one of its own members. If no
/// candidate yields an object, falls back to parsing the slice from the first
/// `{` to the last `}`.
fn extract_object(raw: &str) -> Result<Map<String, Value>, MalformedReplyError> {
    let (first, last) = match (raw.find('{'), raw.rfind('}')) {
        (Some(first), Some(last)) if first < last => (first, last),
        _ => return Err(MalformedReplyError::NoObject),
    };

    let candidates = raw[first..last]
        .match_indices('{')
        .map(|(offset, _)| first + offset)
        .take(MAX_SCAN_CANDIDATES);

    let mut resume_at = first;
    for start in candidates {
        if start < resume_at {
            continue;
        }

        let mut values = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(object))) = values.next() {
            return Ok(object);
        }
        resume_at = span_end(raw, start);
    }

    match serde_json::from_str::<Value>(&raw[first..=last]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(MalformedReplyError::InvalidJson(format!(
            "expected an object, found {}",
            json_type(&other)
        ))),
        Err(e) => Err(MalformedReplyError::InvalidJson(e.to_string())),
    }
}

/// Byte offset just past the `}` that balances the `{` at `start`, or the end
/// of `raw` when it is never closed. Braces inside string literals are not
/// counted.
fn span_end(raw: &str, start: usize) -> usize {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return start + offset + 1;
                }
            }
            _ => {}
        }
    }

    raw.len()
}

fn take_sequence(object: &mut Map<String, Value>, key: &'static str) -> Vec<Value> {
    match object.remove(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::debug!(field = key, found = json_type(&other), "Defaulting non-array field");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn take_recommendation(object: &mut Map<String, Value>) -> String {
    match object.remove("recommendation") {
        Some(Value::String(text)) if !text.trim().is_empty() => text,
        Some(Value::String(_)) | None => FALLBACK_RECOMMENDATION.to_string(),
        Some(other) => {
            tracing::debug!(
                field = "recommendation",
                found = json_type(&other),
                "Defaulting non-string field"
            );
            FALLBACK_RECOMMENDATION.to_string()
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
