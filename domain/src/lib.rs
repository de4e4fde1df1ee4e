//! Domain layer for toolbelt
//!
//! This crate contains the tool-invocation contract and the pure logic of
//! the tool execution layer. It has no dependencies on infrastructure,
//! I/O, or async-runtime concerns.
//!
//! # Core Concepts
//!
//! ## Invocation → Envelope
//!
//! Every capability the dispatcher can perform is one variant of
//! [`ToolInvocation`]; every outcome is a [`ToolResult`] envelope. The
//! envelope contract is uniform across operations with very different
//! failure modes (filesystem errors, network throttling, process exit
//! codes, missing user input).
//!
//! ## Command Sessions
//!
//! [`CommandConfig`] carries the allow-list policy and shell used by the
//! command session layer. Its identity is structural: the infrastructure
//! layer reuses a live session exactly as long as the config compares
//! equal, so the policy is never stale.
//!
//! ## Content Chunking
//!
//! [`ContentChunker`] partitions unbounded fetched documents into
//! bounded, 1-based indexed [`ContentChunk`]s that concatenate losslessly
//! back to the original text.

pub mod command;
pub mod content;
pub mod core;
pub mod tool;

// Re-export commonly used types
pub use command::{
    AllowedCommand, CommandConfig, CommandInput, CommandOutput, DEFAULT_SHELL, ProcessInfo,
    ProcessStatus,
};
pub use content::{ChunkMetadata, ContentChunk, ContentChunker, MAX_CHUNK_SIZE};
pub use crate::core::error::ToolError;
pub use tool::{
    envelope::ToolResult,
    invocation::{AgentFileSpec, FetchOptions, ToolInvocation},
};
