//! Result envelope — the uniform success/failure wrapper.
//!
//! Every dispatcher operation answers with a [`ToolResult`], whatever its
//! failure mode. The constructors enforce the envelope invariants:
//! a failure carries an `error` and no `result`; a success never carries
//! an `error`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ToolError;

/// Uniform result wrapper returned by every dispatcher operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Wire name of the tool that produced this result.
    pub name: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Failure detail; set exactly when `success` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Structured payload; always `None` on failure.
    #[serde(default)]
    pub result: Option<Value>,
}

impl ToolResult {
    /// Create a successful envelope.
    pub fn success(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            message: None,
            error: None,
            result: None,
        }
    }

    /// Create a failure envelope from a [`ToolError`].
    pub fn failure(name: impl Into<String>, error: &ToolError) -> Self {
        Self::failure_text(name, error.to_string())
    }

    /// Create a failure envelope from a plain error message. Used for
    /// in-band failures such as diff-edit "text not found".
    pub fn failure_text(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            message: None,
            error: Some(error.into()),
            result: None,
        }
    }

    /// Attach an outcome description (builder pattern).
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach a structured payload. Only meaningful on success; a failure
    /// envelope keeps `result` empty.
    pub fn with_result(mut self, result: Value) -> Self {
        debug_assert!(self.success, "failure envelopes carry no result");
        if self.success {
            self.result = Some(result);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
