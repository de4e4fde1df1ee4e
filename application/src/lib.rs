//! Application layer for toolbelt
//!
//! Ports (interfaces) that connect the tool dispatcher to the outside
//! world: the dispatch entry point itself, raw website retrieval, the
//! remote agent runtime, and the host settings store. Implementations
//! (adapters) live in the infrastructure layer.

pub mod ports;

// Re-export commonly used types
pub use ports::{
    agent_runtime::{
        AgentCompletion, AgentFileAttachment, AgentInvocation, AgentOutputFile, AgentRuntimeError,
        AgentRuntimePort, GenerateImageRequest, GeneratedImages, InvokeAgentRequest,
    },
    dispatcher::ToolDispatcherPort,
    fetcher::{FetchError, WebsiteFetcherPort},
    settings::SettingsPort,
};
