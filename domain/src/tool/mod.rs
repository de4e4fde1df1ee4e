//! Tool contract module
//!
//! Defines the request/result contract of the tool execution layer:
//!
//! ```text
//! ┌────────────────┐     ┌────────────────┐
//! │ ToolInvocation │ ──▶ │ ToolResult     │
//! │ (tagged union) │     │ (envelope)     │
//! └────────────────┘     └────────────────┘
//! ```
//!
//! Exactly one [`ToolInvocation`](invocation::ToolInvocation) variant is
//! active per call and each carries its own strongly-typed payload, so the
//! dispatcher routes with a single `match`. Every operation — filesystem,
//! command session, web fetch, remote agent — answers with the same
//! [`ToolResult`](envelope::ToolResult) envelope.
//!
//! # Architecture
//!
//! - **Domain** (this module): pure contract types, no I/O
//! - **Application** (`ToolDispatcherPort`): the dispatch port
//! - **Infrastructure** (`ToolDispatcher`): concrete execution with file
//!   I/O, process spawning, and HTTP requests

pub mod envelope;
pub mod invocation;

pub use envelope::ToolResult;
pub use invocation::{AgentFileSpec, FetchOptions, ToolInvocation};
