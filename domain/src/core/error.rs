//! Tool error taxonomy
//!
//! Every failing operation produces a [`ToolError`]. The variant decides
//! how the failure is surfaced to the invoking agent:
//!
//! | Variant | Code | Surfacing |
//! |---------|------|-----------|
//! | `Validation` | `VALIDATION` | message text, before any side effect |
//! | `NotFound` | `NOT_FOUND` | in-band `success: false` envelope |
//! | `Io` | `IO` | message text with the underlying error |
//! | `RateLimit` | `RATE_LIMIT` | structured JSON with model suggestions |
//! | `RemoteService` | `REMOTE_SERVICE` | structured JSON with failure detail |

use serde_json::json;
use thiserror::Error;

/// Error produced by a tool operation.
///
/// `RateLimit` and `RemoteService` render as structured JSON text so the
/// invoking agent can parse failure detail uniformly even when the error
/// travels as a plain string.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// Malformed invocation shape or disallowed request; raised before any
    /// side effect.
    #[error("{0}")]
    Validation(String),

    /// Expected-absent condition with a defined recovery path.
    #[error("{0}")]
    NotFound(String),

    /// Filesystem or process-spawn failure.
    #[error("{0}")]
    Io(String),

    /// Provider-side throttling, with substitution candidates the caller
    /// can retry with.
    #[error("{}", rate_limit_json(.message, .suggested_models))]
    RateLimit {
        message: String,
        suggested_models: Vec<String>,
    },

    /// Failure from an external adapter (agent invocation, retrieval,
    /// search, image generation).
    #[error("{}", remote_service_json(.error, .message))]
    RemoteService { error: String, message: String },
}

impl ToolError {
    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::Validation(_) => "VALIDATION",
            ToolError::NotFound(_) => "NOT_FOUND",
            ToolError::Io(_) => "IO",
            ToolError::RateLimit { .. } => "RATE_LIMIT",
            ToolError::RemoteService { .. } => "REMOTE_SERVICE",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ToolError::NotFound(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        ToolError::Io(message.into())
    }

    pub fn remote_service(error: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::RemoteService {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ToolError::RateLimit { .. })
    }
}

fn rate_limit_json(message: &str, suggested_models: &[String]) -> String {
    json!({
        "success": false,
        "error": "Rate limit exceeded. Please try again with a different model.",
        "suggestedModels": suggested_models,
        "message": message,
    })
    .to_string()
}

fn remote_service_json(error: &str, message: &str) -> String {
    json!({
        "success": false,
        "error": error,
        "message": message,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ToolError::validation("x").code(), "VALIDATION");
        assert_eq!(ToolError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(ToolError::io("x").code(), "IO");
        assert_eq!(
            ToolError::RateLimit {
                message: "x".into(),
                suggested_models: vec![],
            }
            .code(),
            "RATE_LIMIT"
        );
        assert_eq!(ToolError::remote_service("a", "b").code(), "REMOTE_SERVICE");
    }

    #[test]
    fn test_rate_limit_display_is_structured_json() {
        let err = ToolError::RateLimit {
            message: "Too many requests".into(),
            suggested_models: vec!["stability.sd3-large-v1:0".into()],
        };

        let parsed: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["message"], "Too many requests");
        assert_eq!(parsed["suggestedModels"][0], "stability.sd3-large-v1:0");
        assert!(
            parsed["error"]
                .as_str()
                .unwrap()
                .contains("Rate limit exceeded")
        );
    }

    #[test]
    fn test_remote_service_display_is_structured_json() {
        let err = ToolError::remote_service("Failed to invoke agent", "connection reset");

        let parsed: serde_json::Value = serde_json::from_str(&err.to_string()).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["error"], "Failed to invoke agent");
        assert_eq!(parsed["message"], "connection reset");
    }

    #[test]
    fn test_plain_variants_display_message_verbatim() {
        assert_eq!(
            ToolError::io("Error creating folder: denied").to_string(),
            "Error creating folder: denied"
        );
        assert!(!ToolError::validation("bad input").is_rate_limit());
    }
}
