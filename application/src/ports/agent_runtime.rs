//! Agent runtime port — opaque remote calls to the model provider.
//!
//! Image generation, knowledge-base retrieval and agent invocation are
//! external collaborators. This port describes the payloads the
//! dispatcher consumes without prescribing client construction,
//! credentials or regions — those belong to the adapter behind the trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure from the agent runtime.
#[derive(Debug, Clone, Error)]
pub enum AgentRuntimeError {
    /// Provider-signaled rate limiting; the caller should substitute
    /// models rather than retry the same one.
    #[error("throttled: {0}")]
    Throttled(String),

    /// Any other remote failure.
    #[error("{0}")]
    Service(String),
}

impl AgentRuntimeError {
    pub fn is_throttled(&self) -> bool {
        matches!(self, AgentRuntimeError::Throttled(_))
    }

    /// The underlying provider message, whatever the variant.
    pub fn message(&self) -> &str {
        match self {
            AgentRuntimeError::Throttled(m) | AgentRuntimeError::Service(m) => m,
        }
    }
}

/// Image generation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub model_id: String,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<String>,
    pub seed: Option<u32>,
    pub output_format: String,
}

/// Image generation response: base64-encoded images plus per-image seeds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedImages {
    pub images: Vec<String>,
    pub seeds: Vec<u32>,
}

/// File attached to an agent invocation as raw byte content.
#[derive(Debug, Clone)]
pub struct AgentFileAttachment {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
    pub use_case: Option<String>,
}

/// Agent invocation request.
#[derive(Debug, Clone)]
pub struct InvokeAgentRequest {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub session_id: Option<String>,
    pub input_text: String,
    pub enable_trace: bool,
    pub files: Vec<AgentFileAttachment>,
}

/// One file produced by the agent, returned as raw bytes.
#[derive(Debug, Clone)]
pub struct AgentOutputFile {
    pub name: String,
    pub content: Vec<u8>,
}

/// Completion section of an agent invocation response.
#[derive(Debug, Clone, Default)]
pub struct AgentCompletion {
    pub message: Option<String>,
    pub files: Vec<AgentOutputFile>,
}

/// Response of an agent invocation.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub session_id: Option<String>,
    pub content_type: Option<String>,
    pub completion: Option<AgentCompletion>,
}

/// Port for the remote agent runtime.
#[async_trait]
pub trait AgentRuntimePort: Send + Sync {
    /// Generate one or more images for the request.
    async fn generate_image(
        &self,
        request: GenerateImageRequest,
    ) -> Result<GeneratedImages, AgentRuntimeError>;

    /// Query a knowledge base; the payload is returned as provider JSON.
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query: &str,
    ) -> Result<serde_json::Value, AgentRuntimeError>;

    /// Invoke a remote agent, optionally with attached files.
    async fn invoke_agent(
        &self,
        request: InvokeAgentRequest,
    ) -> Result<AgentInvocation, AgentRuntimeError>;
}
