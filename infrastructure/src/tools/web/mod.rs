//! Web tools: fetchWebsite (chunked, cached retrieval) and tavilySearch.

pub mod cache;
pub mod fetch;
pub mod search;

pub use cache::ChunkCache;
pub use fetch::{HttpWebsiteFetcher, execute_fetch_website, extract_main_content};
pub use search::execute_tavily_search;
