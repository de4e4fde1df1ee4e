//! Tool dispatcher port

use async_trait::async_trait;
use toolbelt_domain::{ToolInvocation, ToolResult};

/// Port for dispatching tool invocations.
///
/// The single entry point of the tool execution layer: callers build a
/// [`ToolInvocation`] and receive a [`ToolResult`] envelope; which
/// subsystem performed the work is hidden behind this trait.
///
/// Invocations are independent — callers may dispatch concurrently
/// without waiting for prior calls to finish. No ordering is guaranteed
/// between concurrent invocations beyond what the session and cache
/// layers document.
#[async_trait]
pub trait ToolDispatcherPort: Send + Sync {
    /// Execute one tool invocation and normalize the outcome.
    ///
    /// Never returns a raw error: every failure is serialized into a
    /// `success: false` envelope.
    async fn dispatch(&self, invocation: ToolInvocation) -> ToolResult;
}
