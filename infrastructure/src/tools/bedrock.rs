//! Bedrock-backed tools: generateImage, retrieve, invokeBedrockAgent.
//!
//! The runtime itself stays behind [`AgentRuntimePort`]; these handlers
//! own the glue the envelope contract requires — image persistence,
//! throttling recovery with model substitution, file attachment with MIME
//! inference, and rewriting agent responses to on-disk paths so the
//! envelope never carries raw bytes.

use std::fs;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use tracing::{debug, warn};

use toolbelt_application::{
    AgentFileAttachment, AgentRuntimeError, AgentRuntimePort, GenerateImageRequest,
    InvokeAgentRequest,
};
use toolbelt_domain::{AgentFileSpec, ToolError, ToolResult};

/// Tool name constants
pub const GENERATE_IMAGE: &str = "generateImage";
pub const RETRIEVE: &str = "retrieve";
pub const INVOKE_BEDROCK_AGENT: &str = "invokeBedrockAgent";

/// Models offered as substitutes when the provider throttles a request.
const IMAGE_MODEL_CANDIDATES: [&str; 3] = [
    "stability.sd3-large-v1:0",
    "stability.stable-image-core-v1:1",
    "stability.stable-image-ultra-v1:1",
];

/// Parameters of a generateImage invocation.
pub struct GenerateImageParams {
    pub prompt: String,
    pub output_path: String,
    pub model_id: String,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<String>,
    pub seed: Option<u32>,
    pub output_format: Option<String>,
}

/// Execute the generateImage tool.
///
/// On a throttling-class failure the error payload carries the candidate
/// models minus the one that was just rejected, so the caller can retry
/// with a substitute without another round trip.
pub async fn execute_generate_image(
    runtime: &dyn AgentRuntimePort,
    params: GenerateImageParams,
) -> Result<ToolResult, ToolError> {
    let request = GenerateImageRequest {
        model_id: params.model_id.clone(),
        prompt: params.prompt.clone(),
        negative_prompt: params.negative_prompt.clone(),
        aspect_ratio: params.aspect_ratio.clone(),
        seed: params.seed,
        output_format: params.output_format.clone().unwrap_or_else(|| "png".to_string()),
    };

    let generated = match runtime.generate_image(request).await {
        Ok(generated) => generated,
        Err(AgentRuntimeError::Throttled(message)) => {
            warn!(model = %params.model_id, "image generation throttled");
            return Err(ToolError::RateLimit {
                message,
                suggested_models: suggested_models(&params.model_id),
            });
        }
        Err(e) => {
            return Err(ToolError::remote_service(
                "Failed to generate image",
                e.message(),
            ));
        }
    };

    let image = generated.images.first().ok_or_else(|| {
        ToolError::remote_service("Failed to generate image", "No image was generated")
    })?;

    let bytes = BASE64.decode(image.as_bytes()).map_err(|e| {
        ToolError::remote_service("Failed to generate image", format!("Invalid image payload: {e}"))
    })?;
    fs::write(&params.output_path, bytes)
        .map_err(|e| ToolError::io(format!("Error writing image: {e}")))?;

    debug!(path = %params.output_path, model = %params.model_id, "image saved");

    Ok(ToolResult::success(GENERATE_IMAGE)
        .with_message(format!(
            "Image generated successfully and saved to {}",
            params.output_path
        ))
        .with_result(json!({
            "imagePath": params.output_path,
            "prompt": params.prompt,
            "negativePrompt": params.negative_prompt,
            "aspect_ratio": params.aspect_ratio.unwrap_or_else(|| "1:1".to_string()),
            "modelUsed": params.model_id,
            "seed": generated.seeds.first(),
        })))
}

/// Candidate models minus the one that was throttled.
fn suggested_models(model_id: &str) -> Vec<String> {
    IMAGE_MODEL_CANDIDATES
        .iter()
        .filter(|candidate| **candidate != model_id)
        .map(|candidate| candidate.to_string())
        .collect()
}

/// Execute the retrieve tool against a knowledge base.
pub async fn execute_retrieve(
    runtime: &dyn AgentRuntimePort,
    knowledge_base_id: &str,
    query: &str,
) -> Result<ToolResult, ToolError> {
    let result = runtime.retrieve(knowledge_base_id, query).await.map_err(|e| {
        ToolError::remote_service(
            "Failed to retrieve information from knowledge base",
            e.message(),
        )
    })?;

    Ok(ToolResult::success(RETRIEVE)
        .with_message(format!(
            "Retrieved information from knowledge base {knowledge_base_id}"
        ))
        .with_result(result))
}

/// Parameters of an invokeBedrockAgent invocation.
pub struct InvokeAgentParams {
    pub agent_id: String,
    pub agent_alias_id: String,
    pub input_text: String,
    pub session_id: Option<String>,
    pub file: Option<AgentFileSpec>,
}

/// Execute the invokeBedrockAgent tool.
///
/// A local file, when supplied, is attached as byte content with its MIME
/// type inferred from the extension. Files returned by the agent are
/// written under `project_path` and the result references those paths.
pub async fn execute_invoke_agent(
    runtime: &dyn AgentRuntimePort,
    project_path: &Path,
    params: InvokeAgentParams,
) -> Result<ToolResult, ToolError> {
    let mut files = Vec::new();
    if let Some(spec) = &params.file {
        if let Some(file_path) = &spec.file_path {
            files.push(load_attachment(file_path, spec.use_case.clone())?);
        }
    }

    let request = InvokeAgentRequest {
        agent_id: params.agent_id.clone(),
        agent_alias_id: params.agent_alias_id.clone(),
        session_id: params.session_id.clone(),
        input_text: params.input_text.clone(),
        enable_trace: true,
        files,
    };

    let invocation = runtime
        .invoke_agent(request)
        .await
        .map_err(|e| ToolError::remote_service("Failed to invoke agent", e.message()))?;

    let completion = match invocation.completion {
        Some(completion) => {
            let mut paths = Vec::new();
            for file in &completion.files {
                let path = project_path.join(&file.name);
                fs::write(&path, &file.content).map_err(|e| {
                    ToolError::io(format!("Error writing agent file {}: {e}", path.display()))
                })?;
                debug!(path = %path.display(), "agent file materialized");
                paths.push(path.to_string_lossy().into_owned());
            }
            Some(json!({ "message": completion.message, "files": paths }))
        }
        None => None,
    };

    Ok(ToolResult::success(INVOKE_BEDROCK_AGENT)
        .with_message(format!(
            "Invoked agent {} with alias {}",
            params.agent_id, params.agent_alias_id
        ))
        .with_result(json!({
            "sessionId": invocation.session_id,
            "contentType": invocation.content_type,
            "completion": completion,
        })))
}

fn load_attachment(
    file_path: &str,
    use_case: Option<String>,
) -> Result<AgentFileAttachment, ToolError> {
    let bytes = fs::read(file_path).map_err(|e| ToolError::io(format!("Error reading file: {e}")))?;
    let name = Path::new(file_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string());
    let media_type = mime_type(file_path).to_string();

    Ok(AgentFileAttachment {
        name,
        media_type,
        bytes,
        use_case,
    })
}

/// MIME type inferred from the file extension; `.csv` is always
/// `text/csv` regardless of the table.
pub fn mime_type(file_path: &str) -> &'static str {
    let ext = Path::new(file_path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => "text/csv",
        "html" => "text/html",
        "js" => "text/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "woff" => "application/font-woff",
        "ttf" => "application/font-ttf",
        "eot" => "application/vnd.ms-fontobject",
        "otf" => "application/font-otf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}
