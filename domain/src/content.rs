//! Content chunking — bounded slices of unbounded fetched documents.
//!
//! [`ContentChunker::split_content`] deterministically partitions text
//! into ordered, numbered chunks so that arbitrarily large documents can
//! be consumed one bounded piece at a time. The split is lossless:
//! concatenating `content` over `index = 1..=total` reproduces the input
//! byte for byte. Any content cleaning happens on read, never here — the
//! cache layer always stores the unfiltered split.

use serde::{Deserialize, Serialize};

/// Maximum size of one chunk, in bytes.
pub const MAX_CHUNK_SIZE: usize = 50_000;

/// Source attribution carried by every chunk of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub url: String,
    /// Capture time, milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// One bounded, numbered slice of a larger document.
///
/// For a given source document the chunks are contiguous, non-overlapping,
/// ordered by `index` (1-based), and share the same `total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChunk {
    pub index: usize,
    pub total: usize,
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Deterministic splitter producing [`ContentChunk`] sequences.
pub struct ContentChunker;

impl ContentChunker {
    /// Split `text` into chunks of at most [`MAX_CHUNK_SIZE`] bytes, cut
    /// at UTF-8 character boundaries. The metadata is cloned onto every
    /// chunk. Empty input yields a single empty chunk.
    pub fn split_content(text: &str, metadata: &ChunkMetadata) -> Vec<ContentChunk> {
        Self::split_with_max(text, metadata, MAX_CHUNK_SIZE)
    }

    fn split_with_max(text: &str, metadata: &ChunkMetadata, max: usize) -> Vec<ContentChunk> {
        let mut pieces: Vec<&str> = Vec::new();
        let mut start = 0;

        while start < text.len() {
            let mut end = (start + max).min(text.len());
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            if end == start {
                // A single character wider than `max`; emit it whole.
                end = text[start..]
                    .chars()
                    .next()
                    .map(|c| start + c.len_utf8())
                    .unwrap_or(text.len());
            }
            pieces.push(&text[start..end]);
            start = end;
        }

        if pieces.is_empty() {
            pieces.push("");
        }

        let total = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(i, piece)| ContentChunk {
                index: i + 1,
                total,
                content: piece.to_string(),
                metadata: metadata.clone(),
            })
            .collect()
    }
}
