//! Tool invocation types
//!
//! [`ToolInvocation`] is the discriminated union over every capability the
//! dispatcher performs. Wire names are camelCase, matching the tool
//! contract the agent sees (`createFolder`, `fetchWebsite`, ...). Payload
//! fields are validated by shape at deserialization — a record that fits
//! no variant never reaches a handler.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::command::CommandInput;

/// A single typed request for the dispatcher to perform one capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "camelCase")]
pub enum ToolInvocation {
    #[serde(rename_all = "camelCase")]
    CreateFolder { folder_path: String },

    #[serde(rename_all = "camelCase")]
    WriteToFile { file_path: String, content: String },

    #[serde(rename_all = "camelCase")]
    ApplyDiffEdit {
        path: String,
        original_text: String,
        updated_text: String,
    },

    #[serde(rename_all = "camelCase")]
    ReadFiles { file_paths: Vec<String> },

    #[serde(rename_all = "camelCase")]
    ListFiles {
        dir_path: String,
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        ignore_files: Option<Vec<String>>,
    },

    MoveFile { source: String, destination: String },

    CopyFile { source: String, destination: String },

    #[serde(rename_all = "camelCase")]
    TavilySearch { query: String, api_key: String },

    #[serde(rename_all = "camelCase")]
    FetchWebsite {
        url: String,
        /// 1-based chunk to return instead of the summary.
        #[serde(default)]
        chunk_index: Option<usize>,
        /// Strip the returned content down to the main document text.
        #[serde(default)]
        cleaning: Option<bool>,
        /// Request options forwarded to the fetch collaborator.
        #[serde(default)]
        options: FetchOptions,
    },

    #[serde(rename_all = "camelCase")]
    GenerateImage {
        prompt: String,
        output_path: String,
        model_id: String,
        #[serde(default)]
        negative_prompt: Option<String>,
        #[serde(default, rename = "aspect_ratio")]
        aspect_ratio: Option<String>,
        #[serde(default)]
        seed: Option<u32>,
        #[serde(default, rename = "output_format")]
        output_format: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Retrieve {
        knowledge_base_id: String,
        query: String,
    },

    #[serde(rename_all = "camelCase")]
    InvokeBedrockAgent {
        agent_id: String,
        agent_alias_id: String,
        input_text: String,
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        file: Option<AgentFileSpec>,
    },

    ExecuteCommand { input: CommandInput },
}

impl ToolInvocation {
    /// Wire name of the tool, as it appears in the result envelope.
    pub fn name(&self) -> &'static str {
        match self {
            ToolInvocation::CreateFolder { .. } => "createFolder",
            ToolInvocation::WriteToFile { .. } => "writeToFile",
            ToolInvocation::ApplyDiffEdit { .. } => "applyDiffEdit",
            ToolInvocation::ReadFiles { .. } => "readFiles",
            ToolInvocation::ListFiles { .. } => "listFiles",
            ToolInvocation::MoveFile { .. } => "moveFile",
            ToolInvocation::CopyFile { .. } => "copyFile",
            ToolInvocation::TavilySearch { .. } => "tavilySearch",
            ToolInvocation::FetchWebsite { .. } => "fetchWebsite",
            ToolInvocation::GenerateImage { .. } => "generateImage",
            ToolInvocation::Retrieve { .. } => "retrieve",
            ToolInvocation::InvokeBedrockAgent { .. } => "invokeBedrockAgent",
            ToolInvocation::ExecuteCommand { .. } => "executeCommand",
        }
    }
}

/// File attachment request for `invokeBedrockAgent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentFileSpec {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub use_case: Option<String>,
}

/// Request options forwarded to the website fetch collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchOptions {
    pub method: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_wire_names() {
        let invocation: ToolInvocation =
            serde_json::from_str(r#"{"tool": "createFolder", "folderPath": "/tmp/out"}"#).unwrap();

        assert_eq!(invocation.name(), "createFolder");
        assert!(matches!(invocation, ToolInvocation::CreateFolder { .. }));
    }

    #[test]
    fn test_fetch_website_optional_fields_default() {
        let invocation: ToolInvocation =
            serde_json::from_str(r#"{"tool": "fetchWebsite", "url": "https://example.com"}"#)
                .unwrap();

        match invocation {
            ToolInvocation::FetchWebsite {
                url,
                chunk_index,
                cleaning,
                options,
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(chunk_index, None);
                assert_eq!(cleaning, None);
                assert_eq!(options, FetchOptions::default());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_generate_image_mixed_field_naming() {
        // The original contract mixes camelCase (negativePrompt) with
        // snake_case (aspect_ratio, output_format).
        let invocation: ToolInvocation = serde_json::from_str(
            r#"{
                "tool": "generateImage",
                "prompt": "a lighthouse",
                "outputPath": "/tmp/out.png",
                "modelId": "stability.sd3-large-v1:0",
                "negativePrompt": "blurry",
                "aspect_ratio": "16:9",
                "output_format": "webp"
            }"#,
        )
        .unwrap();

        match invocation {
            ToolInvocation::GenerateImage {
                negative_prompt,
                aspect_ratio,
                output_format,
                ..
            } => {
                assert_eq!(negative_prompt.as_deref(), Some("blurry"));
                assert_eq!(aspect_ratio.as_deref(), Some("16:9"));
                assert_eq!(output_format.as_deref(), Some("webp"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_execute_command_carries_tagged_input() {
        let invocation: ToolInvocation = serde_json::from_str(
            r#"{
                "tool": "executeCommand",
                "input": {"kind": "newCommand", "command": "ls -la", "cwd": "/tmp"}
            }"#,
        )
        .unwrap();

        assert_eq!(invocation.name(), "executeCommand");
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let invalid: Result<ToolInvocation, _> =
            serde_json::from_str(r#"{"tool": "formatDisk", "device": "/dev/sda"}"#);
        assert!(invalid.is_err());
    }
}
