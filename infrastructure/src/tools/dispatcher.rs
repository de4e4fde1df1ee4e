//! Tool dispatcher — the single entry point of the execution layer.
//!
//! [`ToolDispatcher`] routes a typed [`ToolInvocation`] to the operation
//! that performs it and normalizes every outcome into a [`ToolResult`]
//! envelope. Handlers answer `Ok(envelope)` or `Err(ToolError)`; the
//! dispatcher serializes errors into `success: false` envelopes, so
//! callers never see a raw error.
//!
//! # Execution Paths
//!
//! ```text
//! ToolDispatcherPort::dispatch()
//!   ├─ filesystem ops        → file / list  (synchronous std::fs)
//!   ├─ executeCommand        → CommandSessionManager (config-keyed)
//!   ├─ fetchWebsite          → WebsiteFetcherPort + ChunkCache
//!   ├─ tavilySearch          → shared reqwest::Client
//!   └─ generateImage / retrieve / invokeBedrockAgent → AgentRuntimePort
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use toolbelt_application::{
    AgentRuntimePort, SettingsPort, ToolDispatcherPort, WebsiteFetcherPort,
};
use toolbelt_domain::{ToolError, ToolInvocation, ToolResult};

use super::bedrock::{self, GenerateImageParams, InvokeAgentParams};
use super::command::{self, CommandSessionManager};
use super::file;
use super::list;
use super::web::{self, ChunkCache};

/// Routes typed tool invocations to the subsystem that performs them.
///
/// The dispatcher owns the shared state the operations need — the live
/// command session, the chunk cache, one HTTP client — and borrows the
/// external collaborators through ports. It is `Send + Sync`; independent
/// callers may dispatch concurrently.
pub struct ToolDispatcher {
    fetcher: Arc<dyn WebsiteFetcherPort>,
    agent_runtime: Arc<dyn AgentRuntimePort>,
    settings: Arc<dyn SettingsPort>,
    sessions: CommandSessionManager,
    chunk_cache: ChunkCache,
    http_client: reqwest::Client,
}

impl ToolDispatcher {
    pub fn new(
        fetcher: Arc<dyn WebsiteFetcherPort>,
        agent_runtime: Arc<dyn AgentRuntimePort>,
        settings: Arc<dyn SettingsPort>,
    ) -> Self {
        Self {
            fetcher,
            agent_runtime,
            settings,
            sessions: CommandSessionManager::new(),
            chunk_cache: ChunkCache::new(),
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    async fn execute(&self, invocation: ToolInvocation) -> Result<ToolResult, ToolError> {
        match invocation {
            ToolInvocation::CreateFolder { folder_path } => {
                file::execute_create_folder(&folder_path)
            }
            ToolInvocation::WriteToFile { file_path, content } => {
                file::execute_write_to_file(&file_path, &content)
            }
            ToolInvocation::ApplyDiffEdit {
                path,
                original_text,
                updated_text,
            } => file::execute_apply_diff_edit(&path, &original_text, &updated_text),
            ToolInvocation::ReadFiles { file_paths } => file::execute_read_files(&file_paths),
            ToolInvocation::ListFiles {
                dir_path,
                prefix,
                ignore_files,
            } => list::execute_list_files(
                &dir_path,
                prefix.as_deref().unwrap_or(""),
                ignore_files.as_deref(),
            ),
            ToolInvocation::MoveFile {
                source,
                destination,
            } => file::execute_move_file(&source, &destination),
            ToolInvocation::CopyFile {
                source,
                destination,
            } => file::execute_copy_file(&source, &destination),
            ToolInvocation::TavilySearch { query, api_key } => {
                web::execute_tavily_search(&self.http_client, &query, &api_key).await
            }
            ToolInvocation::FetchWebsite {
                url,
                chunk_index,
                cleaning,
                options,
            } => {
                web::execute_fetch_website(
                    self.fetcher.as_ref(),
                    &self.chunk_cache,
                    &url,
                    chunk_index,
                    cleaning.unwrap_or(false),
                    &options,
                )
                .await
            }
            ToolInvocation::GenerateImage {
                prompt,
                output_path,
                model_id,
                negative_prompt,
                aspect_ratio,
                seed,
                output_format,
            } => {
                bedrock::execute_generate_image(
                    self.agent_runtime.as_ref(),
                    GenerateImageParams {
                        prompt,
                        output_path,
                        model_id,
                        negative_prompt,
                        aspect_ratio,
                        seed,
                        output_format,
                    },
                )
                .await
            }
            ToolInvocation::Retrieve {
                knowledge_base_id,
                query,
            } => {
                bedrock::execute_retrieve(self.agent_runtime.as_ref(), &knowledge_base_id, &query)
                    .await
            }
            ToolInvocation::InvokeBedrockAgent {
                agent_id,
                agent_alias_id,
                input_text,
                session_id,
                file,
            } => {
                bedrock::execute_invoke_agent(
                    self.agent_runtime.as_ref(),
                    &self.settings.project_path(),
                    InvokeAgentParams {
                        agent_id,
                        agent_alias_id,
                        input_text,
                        session_id,
                        file,
                    },
                )
                .await
            }
            ToolInvocation::ExecuteCommand { input } => {
                // The policy is re-read per call so a settings change is
                // picked up before anything spawns.
                let config = self.settings.command_config();
                let described = serde_json::to_string(&input)
                    .map_err(|e| ToolError::validation(format!("Invalid input format: {e}")))?;

                let output = self.sessions.execute(input, config).await?;
                let payload = serde_json::to_value(&output)
                    .map_err(|e| ToolError::io(format!("Failed to serialize output: {e}")))?;

                Ok(ToolResult::success(command::EXECUTE_COMMAND)
                    .with_message(format!("Command executed: {described}"))
                    .with_result(payload))
            }
        }
    }
}

#[async_trait]
impl ToolDispatcherPort for ToolDispatcher {
    async fn dispatch(&self, invocation: ToolInvocation) -> ToolResult {
        let name = invocation.name();
        let start = Instant::now();

        let result = self
            .execute(invocation)
            .await
            .unwrap_or_else(|e| ToolResult::failure(name, &e));

        debug!(
            tool = name,
            success = result.success,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tool dispatched"
        );
        result
    }
}
