//! Parsing helpers for provider JSON responses.
//!
//! Providers asked for strict JSON still sometimes wrap the document in a
//! Markdown code fence; responses must be unwrapped before parsing.

use serde_json::Value;

use crate::error::DomainError;

/// Strips a surrounding Markdown code fence (with an optional language tag)
/// from a provider response. Input without a fence is returned trimmed.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(idx) if rest[..idx].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[idx + 1..],
        _ => rest,
    };
    rest.trim()
}

/// Parses a provider response as JSON, tolerating a code fence wrapper.
///
/// # Errors
///
/// Returns `DomainError::Provider` if the unwrapped text is not valid JSON.
pub fn parse_json(raw: &str) -> Result<Value, DomainError> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| DomainError::Provider(format!("response was not valid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_json_passes_through() {
        let value = parse_json(r#"{"questions": ["a"]}"#).unwrap();
        assert_eq!(value["questions"][0], "a");
    }

    #[test]
    fn test_fence_with_language_tag_is_stripped() {
        let raw = "```json\n{\"key\": \"value\"}\n```";
        let value = parse_json(raw).unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn test_fence_without_language_tag_is_stripped() {
        let raw = "```\n{\"key\": \"value\"}\n```";
        let value = parse_json(raw).unwrap();
        assert_eq!(value["key"], "value");
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let raw = "  \n```json\n{\"n\": 1}\n```  \n";
        let value = parse_json(raw).unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn test_invalid_json_is_a_provider_error() {
        let result = parse_json("```json\nnot json\n```");
        assert!(matches!(result, Err(DomainError::Provider(_))));
    }
}
