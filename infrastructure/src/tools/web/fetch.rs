//! fetchWebsite tool — retrieval with content chunking and caching.
//!
//! The first fetch of a URL retrieves the document, splits it with
//! [`ContentChunker`] and stores the unfiltered split in the
//! [`ChunkCache`]; every later call for that URL pages through the cached
//! chunks without touching the network. Content cleaning
//! ([`extract_main_content`]) is applied on read only — the cache always
//! keeps the raw split.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use tracing::debug;

use toolbelt_application::{FetchError, WebsiteFetcherPort};
use toolbelt_domain::{ChunkMetadata, ContentChunk, ContentChunker, FetchOptions, ToolError, ToolResult};

use super::cache::ChunkCache;

/// Tool name constant
pub const FETCH_WEBSITE: &str = "fetchWebsite";

/// Execute the fetchWebsite tool.
pub async fn execute_fetch_website(
    fetcher: &dyn WebsiteFetcherPort,
    cache: &ChunkCache,
    url: &str,
    chunk_index: Option<usize>,
    cleaning: bool,
    options: &FetchOptions,
) -> Result<ToolResult, ToolError> {
    let chunks = match cache.get(url) {
        Some(chunks) => {
            debug!(url, "chunk cache hit");
            chunks
        }
        None => {
            let raw = fetcher
                .fetch(url, options)
                .await
                .map_err(|e| ToolError::io(format!("Error fetching website: {e}")))?;
            let metadata = ChunkMetadata {
                url: url.to_string(),
                timestamp: Utc::now().timestamp_millis(),
            };
            debug!(url, bytes = raw.len(), "fetched and splitting");
            cache.insert(url, ContentChunker::split_content(&raw, &metadata))
        }
    };

    if let Some(index) = chunk_index {
        let total = chunks.len();
        if index < 1 || index > total {
            return Err(ToolError::validation(format!(
                "Invalid chunk index. Available chunks: 1 to {total}"
            )));
        }

        let chunk = &chunks[index - 1];
        let content = if cleaning {
            extract_main_content(&chunk.content)
        } else {
            chunk.content.clone()
        };
        return Ok(ToolResult::success(FETCH_WEBSITE)
            .with_message(format!("Chunk {}/{}:\n\n{content}", chunk.index, chunk.total))
            .with_result(json!({
                "url": url,
                "index": chunk.index,
                "total": chunk.total,
            })));
    }

    if chunks.len() == 1 {
        return Ok(ToolResult::success(FETCH_WEBSITE)
            .with_message(format!(
                "Content successfully retrieved:\n\n{}",
                chunks[0].content
            ))
            .with_result(json!({ "url": url, "total": 1 })));
    }

    Ok(ToolResult::success(FETCH_WEBSITE)
        .with_message(chunk_summary(&chunks))
        .with_result(json!({ "url": url, "total": chunks.len() })))
}

/// Summary returned when a multi-chunk document is fetched without an
/// explicit chunk index, forcing the caller to page explicitly.
fn chunk_summary(chunks: &[ContentChunk]) -> String {
    let first = &chunks[0];
    let timestamp = chrono::DateTime::from_timestamp_millis(first.metadata.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();

    [
        format!(
            "Content successfully retrieved and split into {} chunks:",
            chunks.len()
        ),
        format!("URL: {}", first.metadata.url),
        format!("Timestamp: {timestamp}"),
        "\nTo retrieve specific chunks, use the fetchWebsite tool with chunkIndex option:"
            .to_string(),
        format!("Total Chunks: {}", chunks.len()),
        "Example usage:".to_string(),
        "```".to_string(),
        format!("fetchWebsite(\"{}\", {{ chunkIndex: 1 }})", first.metadata.url),
        "```\n".to_string(),
    ]
    .join("\n")
}

/// Best-effort main-content extraction for HTML documents.
///
/// Prefers `<main>`, then `<article>`, then `<body>`; skips script,
/// style and layout chrome. Non-HTML input gets whitespace cleanup only.
pub fn extract_main_content(text: &str) -> String {
    if !text.contains('<') {
        return clean_whitespace(text);
    }

    let document = Html::parse_document(text);
    let skip_tags = [
        "script", "style", "noscript", "svg", "nav", "header", "footer", "aside",
    ];

    let root = ["main", "article", "body"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document.select(&selector).next()
    });

    let parts = match root {
        Some(element) => collect_element_text(element, &skip_tags),
        None => collect_element_text(document.root_element(), &skip_tags),
    };

    clean_whitespace(&parts.join(" "))
}

/// Recursively collect text nodes, pruning subtrees named in `skip_tags`.
fn collect_element_text(element: ElementRef, skip_tags: &[&str]) -> Vec<String> {
    if skip_tags.contains(&element.value().name()) {
        return Vec::new();
    }

    let mut parts = Vec::new();
    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed.to_string());
                }
            }
            scraper::Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    parts.extend(collect_element_text(child_element, skip_tags));
                }
            }
            _ => {}
        }
    }
    parts
}

/// Collapse whitespace runs: a run containing a newline becomes one
/// newline, any other run becomes one space.
fn clean_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    let mut run_has_newline = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            in_run = true;
            run_has_newline |= ch == '\n';
        } else {
            if in_run && !out.is_empty() {
                out.push(if run_has_newline { '\n' } else { ' ' });
            }
            in_run = false;
            run_has_newline = false;
            out.push(ch);
        }
    }

    out
}

/// `reqwest`-backed implementation of [`WebsiteFetcherPort`].
pub struct HttpWebsiteFetcher {
    client: reqwest::Client,
}

impl HttpWebsiteFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpWebsiteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebsiteFetcherPort for HttpWebsiteFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError> {
        let method_name = options.method.as_deref().unwrap_or("GET").to_uppercase();
        let method = reqwest::Method::from_bytes(method_name.as_bytes())
            .map_err(|_| FetchError::Transport(format!("Invalid method: {method_name}")))?;

        let mut request = self
            .client
            .request(method, url)
            .header("User-Agent", "toolbelt/0.4 (Agent Tool)");
        for (key, value) in &options.headers {
            request = request.header(key, value);
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        // JSON bodies are pretty-printed so chunk boundaries fall on
        // readable text.
        if content_type.contains("application/json") {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                return Ok(serde_json::to_string_pretty(&value).unwrap_or(text));
            }
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        body: String,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(body: impl Into<String>) -> Self {
            Self {
                body: body.into(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebsiteFetcherPort for CountingFetcher {
        async fn fetch(&self, _url: &str, _options: &FetchOptions) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    const URL: &str = "https://example.com/page";

    #[tokio::test]
    async fn test_single_chunk_returns_content_directly() {
        let fetcher = CountingFetcher::new("short document");
        let cache = ChunkCache::new();

        let result = execute_fetch_website(&fetcher, &cache, URL, None, false, &FetchOptions::default())
            .await
            .unwrap();

        let message = result.message.unwrap();
        assert!(message.starts_with("Content successfully retrieved:"));
        assert!(message.contains("short document"));
    }

    #[tokio::test]
    async fn test_large_document_returns_summary() {
        let fetcher = CountingFetcher::new("x".repeat(120_000));
        let cache = ChunkCache::new();

        let result = execute_fetch_website(&fetcher, &cache, URL, None, false, &FetchOptions::default())
            .await
            .unwrap();

        let message = result.message.unwrap();
        assert!(message.contains("split into 3 chunks"));
        assert!(message.contains(&format!("URL: {URL}")));
        assert!(message.contains("chunkIndex: 1"));
        // The summary never inlines the content itself.
        assert!(!message.contains(&"x".repeat(100)));
    }

    #[tokio::test]
    async fn test_chunk_index_pages_through_content() {
        let fetcher = CountingFetcher::new("y".repeat(120_000));
        let cache = ChunkCache::new();

        let result = execute_fetch_website(&fetcher, &cache, URL, Some(3), false, &FetchOptions::default())
            .await
            .unwrap();

        let message = result.message.unwrap();
        assert!(message.starts_with("Chunk 3/3:"));
        assert_eq!(result.result.unwrap()["index"], 3);
    }

    #[tokio::test]
    async fn test_out_of_range_chunk_index_names_bounds() {
        let fetcher = CountingFetcher::new("z".repeat(120_000));
        let cache = ChunkCache::new();

        for bad_index in [0usize, 4, 99] {
            let err = execute_fetch_website(
                &fetcher,
                &cache,
                URL,
                Some(bad_index),
                false,
                &FetchOptions::default(),
            )
            .await
            .unwrap_err();

            assert_eq!(err.code(), "VALIDATION");
            assert_eq!(
                err.to_string(),
                "Invalid chunk index. Available chunks: 1 to 3"
            );
        }
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let fetcher = CountingFetcher::new("cached body");
        let cache = ChunkCache::new();

        let first = execute_fetch_website(&fetcher, &cache, URL, None, false, &FetchOptions::default())
            .await
            .unwrap();
        let second = execute_fetch_website(&fetcher, &cache, URL, None, false, &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(first.message, second.message);
    }

    #[tokio::test]
    async fn test_cleaning_applies_on_read_not_in_cache() {
        let html = "<html><body><main><p>Main text</p></main><script>var x;</script></body></html>";
        let fetcher = CountingFetcher::new(html);
        let cache = ChunkCache::new();

        let cleaned = execute_fetch_website(&fetcher, &cache, URL, Some(1), true, &FetchOptions::default())
            .await
            .unwrap();
        assert!(cleaned.message.unwrap().contains("Main text"));

        // The cache kept the raw split: fetching without cleaning returns
        // the original markup.
        let raw = execute_fetch_website(&fetcher, &cache, URL, Some(1), false, &FetchOptions::default())
            .await
            .unwrap();
        assert!(raw.message.unwrap().contains("<script>"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_extract_main_content_prefers_main_element() {
        let html = r#"
        <html><body>
            <nav>Site navigation</nav>
            <main><h1>Title</h1><p>Body text</p></main>
            <footer>Copyright</footer>
        </body></html>
        "#;

        let text = extract_main_content(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Body text"));
        assert!(!text.contains("Site navigation"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_extract_main_content_strips_script_and_style() {
        let html = r#"
        <html><body>
            <script>var hidden = 1;</script>
            <style>.x { color: red; }</style>
            <p>Visible</p>
        </body></html>
        "#;

        let text = extract_main_content(html);
        assert!(text.contains("Visible"));
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_extract_main_content_passes_plain_text_through() {
        assert_eq!(extract_main_content("  plain   text  "), "plain text");
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("a   b"), "a b");
        assert_eq!(clean_whitespace("a \n\n b"), "a\nb");
        assert_eq!(clean_whitespace("  edge  "), "edge");
    }
}
