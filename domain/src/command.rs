//! Command session value types
//!
//! The command execution layer keeps native processes alive across calls.
//! These types describe its inputs and outputs: the security policy a
//! session is built from ([`CommandConfig`]), the two call shapes
//! ([`CommandInput`]), and the merged result ([`CommandOutput`]).
//!
//! # Session identity
//!
//! A live session is keyed by the **structural** identity of its config:
//! two configs are the same session iff every allow rule and the shell
//! path compare equal. [`CommandConfig::fingerprint`] condenses that
//! identity into a hash for logging; equality itself is plain `==`.

use serde::{Deserialize, Serialize};
use std::hash::{DefaultHasher, Hash, Hasher};

/// Shell used when the configuration store carries none.
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// One allow-list rule: a wildcard pattern plus a human description.
///
/// Patterns use `*` as "any text" (e.g. `ls *`); matching is anchored to
/// the whole command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowedCommand {
    pub pattern: String,
    pub description: String,
}

/// Security policy and shell selection for command sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandConfig {
    pub allowed_commands: Vec<AllowedCommand>,
    pub shell: String,
}

impl CommandConfig {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            allowed_commands: Vec::new(),
            shell: shell.into(),
        }
    }

    /// Add an allow rule (builder pattern).
    pub fn allow(mut self, pattern: impl Into<String>, description: impl Into<String>) -> Self {
        self.allowed_commands.push(AllowedCommand {
            pattern: pattern.into(),
            description: description.into(),
        });
        self
    }

    /// Stable hash of the structural identity, for logging session
    /// construction and replacement.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL).allow("ls *", "List directory contents")
    }
}

/// Input to `executeCommand`: a tagged union over the two call shapes.
///
/// The tag makes routing a single discriminant check; a payload that is
/// neither shape fails at deserialization, before any process is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommandInput {
    /// Start a new command in `cwd`.
    NewCommand { command: String, cwd: String },
    /// Send stdin to a tracked, input-awaiting process.
    SendStdin { pid: u32, stdin: String },
}

/// Lifecycle state of a tracked subprocess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProcessStatus {
    Running,
    AwaitingInput,
    Terminated,
}

/// A live or terminated subprocess tracked by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInfo {
    pub pid: u32,
    pub command: String,
    pub status: ProcessStatus,
}

/// Result of a command-session call, merged into the result envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Set once the process has exited; `None` while it is still running
    /// or awaiting input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_info: Option<ProcessInfo>,
    /// True when the process blocked on a prompt and expects stdin.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_input: bool,
    /// The detected prompt text, when `requires_input` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}
