//! Line-window chunking of repository file contents.
//!
//! Splits a file into overlapping windows of whole lines. Chunk identity is
//! derived from the path and 1-based inclusive line range, so re-chunking
//! unchanged content always produces the same ids.

use crate::error::{IndexError, Result};

const DEFAULT_SIZE: usize = 800;
const DEFAULT_OVERLAP: usize = 160;

/// One chunk of file text with its line addressing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub id: String,
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
}

/// Chunker configuration.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Window length in lines (default: 800).
    pub size: usize,
    /// Window overlap in lines (default: 160). Must be strictly smaller
    /// than `size` or the window would never advance.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// Validated line-window chunker.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidChunkConfig`] when `overlap >= size`.
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        if config.size == 0 || config.overlap >= config.size {
            return Err(IndexError::InvalidChunkConfig {
                size: config.size,
                overlap: config.overlap,
            });
        }
        Ok(Self { config })
    }

    /// Split `content` into overlapping line windows.
    ///
    /// Empty or whitespace-only content yields an empty sequence. Line
    /// ranges are 1-based and inclusive; the final window may be short.
    #[must_use]
    pub fn chunk(&self, path: &str, content: &str) -> Vec<TextChunk> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let mut chunks = Vec::new();
        let mut cursor = 0usize;

        loop {
            let window = &lines[cursor..lines.len().min(cursor + self.config.size)];
            let text = window.join("\n");
            let text = text.trim();

            if !text.is_empty() {
                let start = cursor + 1;
                let end = cursor + window.len();
                chunks.push(TextChunk {
                    id: format!("{path}:{start}-{end}"),
                    path: path.to_string(),
                    start_line: start,
                    end_line: end,
                    content: text.to_string(),
                });
            }

            if cursor + self.config.size >= lines.len() {
                break;
            }
            cursor += self.config.size - self.config.overlap;
        }

        chunks
    }
}
