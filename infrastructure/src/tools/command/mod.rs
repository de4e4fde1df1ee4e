//! Command execution sessions: executeCommand
//!
//! [`CommandSessionManager`] owns at most one live [`CommandService`] at a
//! time, keyed by structural equality of [`CommandConfig`] — so the
//! allow-list policy in force always matches the caller's current
//! configuration. The service itself tracks spawned processes, letting
//! commands that block on a prompt be resumed with stdin across calls:
//!
//! ```text
//! created → running → (awaiting-input ⇄ running)* → terminated
//! ```

mod service;

pub use service::CommandService;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;

use toolbelt_domain::{CommandConfig, CommandInput, CommandOutput, ToolError};

/// Tool name constant
pub const EXECUTE_COMMAND: &str = "executeCommand";

struct SessionState {
    service: Arc<CommandService>,
    config: CommandConfig,
}

/// Config-keyed owner of the live command service.
pub struct CommandSessionManager {
    state: Mutex<Option<SessionState>>,
}

impl CommandSessionManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Execute a command-session call under `config`.
    ///
    /// If `config` differs structurally from the one the live service was
    /// built from, the old service is shut down — every tracked process
    /// killed and reaped — and a fresh one is constructed before dispatch.
    /// The comparison and swap happen under one lock, so concurrent
    /// callers never observe a half-replaced session.
    pub async fn execute(
        &self,
        input: CommandInput,
        config: CommandConfig,
    ) -> Result<CommandOutput, ToolError> {
        let service = self.service_for(config).await?;
        match input {
            CommandInput::NewCommand { command, cwd } => {
                service.execute_command(&command, &cwd).await
            }
            CommandInput::SendStdin { pid, stdin } => service.send_input(pid, &stdin).await,
        }
    }

    async fn service_for(&self, config: CommandConfig) -> Result<Arc<CommandService>, ToolError> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.as_ref() {
            if existing.config == config {
                return Ok(Arc::clone(&existing.service));
            }
        }

        if let Some(old) = state.take() {
            info!(
                old = old.config.fingerprint(),
                new = config.fingerprint(),
                "command config changed, replacing session"
            );
            old.service.shutdown().await;
        }

        let service = Arc::new(CommandService::new(&config)?);
        *state = Some(SessionState {
            service: Arc::clone(&service),
            config,
        });
        Ok(service)
    }
}

impl Default for CommandSessionManager {
    fn default() -> Self {
        Self::new()
    }
}
