//! JSON extraction from model replies
//!
//! Models asked for strict JSON still wrap it in markdown fences or prose
//! often enough that parsing has to be defensive: strip the fences, try the
//! whole reply, then fall back to the outermost object or array span.

use serde::de::DeserializeOwned;

use crate::error::{LlmError, LlmResult};

/// Remove markdown code fences and surrounding whitespace
pub fn clean_response(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// The outermost `{...}` span, if any
pub fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// The outermost `[...]` span, if any
pub fn extract_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a reply expected to contain one JSON object
pub fn parse_object<T: DeserializeOwned>(text: &str) -> LlmResult<T> {
    let cleaned = clean_response(text);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }
    let span = extract_object(&cleaned)
        .ok_or_else(|| LlmError::InvalidResponse("No valid JSON found in response".to_string()))?;
    Ok(serde_json::from_str(span)?)
}

/// Parse a reply expected to contain one JSON array
pub fn parse_array<T: DeserializeOwned>(text: &str) -> LlmResult<Vec<T>> {
    let cleaned = clean_response(text);
    if let Ok(value) = serde_json::from_str(&cleaned) {
        return Ok(value);
    }
    let span = extract_array(&cleaned).ok_or_else(|| {
        LlmError::InvalidResponse("No valid JSON array found in response".to_string())
    })?;
    Ok(serde_json::from_str(span)?)
}
