//! tavilySearch tool — web search via the Tavily API.

use serde_json::{Value, json};
use tracing::debug;

use toolbelt_domain::{ToolError, ToolResult};

/// Tool name constant
pub const TAVILY_SEARCH: &str = "tavilySearch";

const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// Execute the tavilySearch tool.
///
/// The response body is returned verbatim as the result payload; the
/// caller decides how to digest it.
pub async fn execute_tavily_search(
    client: &reqwest::Client,
    query: &str,
    api_key: &str,
) -> Result<ToolResult, ToolError> {
    let response = client
        .post(TAVILY_API_URL)
        .json(&search_request_body(query, api_key))
        .send()
        .await
        .map_err(|e| ToolError::remote_service("Error searching", e.to_string()))?;

    let payload: Value = response
        .json()
        .await
        .map_err(|e| ToolError::remote_service("Error searching", e.to_string()))?;

    debug!(query, "tavily search completed");

    Ok(ToolResult::success(TAVILY_SEARCH)
        .with_message(format!("Searched using Tavily. Query: {query}"))
        .with_result(payload))
}

fn search_request_body(query: &str, api_key: &str) -> Value {
    json!({
        "api_key": api_key,
        "query": query,
        "search_depth": "advanced",
        "include_answer": true,
        "include_images": true,
        "include_raw_content": true,
        "max_results": 5,
        "include_domains": [],
        "exclude_domains": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_body_shape() {
        let body = search_request_body("rust async runtimes", "tvly-key");

        assert_eq!(body["api_key"], "tvly-key");
        assert_eq!(body["query"], "rust async runtimes");
        assert_eq!(body["search_depth"], "advanced");
        assert_eq!(body["include_answer"], true);
        assert_eq!(body["include_images"], true);
        assert_eq!(body["include_raw_content"], true);
        assert_eq!(body["max_results"], 5);
        assert_eq!(body["include_domains"], json!([]));
        assert_eq!(body["exclude_domains"], json!([]));
    }
}
