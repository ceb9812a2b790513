//! Structured error types for pageflow.
//!
//! Only genuinely failing operations return these. Deprecated styles,
//! unresolved fonts and degenerate geometry are absorbed where they occur
//! and reported through [`crate::diagnostics`] instead.

use thiserror::Error;

/// The unified error type returned by the public pageflow API.
#[derive(Debug, Error)]
pub enum FlowError {
    /// JSON input failed to parse as a text tree or engine config.
    #[error("Failed to parse text node: {source}{}", format_hint(.hint))]
    ParseError {
        source: serde_json::Error,
        hint: String,
    },
    /// A custom font could not be decoded or parsed.
    #[error("Font error: {0}")]
    FontError(String),
    /// The layout engine could not lay out the attributed string.
    #[error("Layout error: {0}")]
    LayoutError(String),
    /// A window was split or rendered before its layout ran. This is a bug in
    /// the calling driver, not a retryable condition.
    #[error("text window has not been laid out")]
    NotLaidOut,
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the text node schema. Children must be strings or node objects.".to_string()
            }
            serde_json::error::Category::Eof => "Unexpected end of input, is the JSON truncated?".to_string(),
            serde_json::error::Category::Io => String::new(),
        };
        FlowError::ParseError { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_hint() {
        let err: FlowError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse text node"), "got: {msg}");
        assert!(msg.contains("Hint: Check for trailing commas"), "got: {msg}");
    }

    #[test]
    fn test_not_laid_out_message() {
        assert_eq!(
            FlowError::NotLaidOut.to_string(),
            "text window has not been laid out"
        );
    }
}
