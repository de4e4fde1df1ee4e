//! Website fetch port

use async_trait::async_trait;
use thiserror::Error;
use toolbelt_domain::FetchOptions;

/// Failure from the raw-retrieval collaborator.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP error: {status}")]
    Status { status: u16 },

    /// The request never produced a response.
    #[error("{0}")]
    Transport(String),
}

/// Port for raw website retrieval.
///
/// Returns the response body as text. Chunking, caching and content
/// cleaning are the dispatcher's concern, not the fetcher's — a fetcher
/// implementation only moves bytes.
#[async_trait]
pub trait WebsiteFetcherPort: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, FetchError>;
}
