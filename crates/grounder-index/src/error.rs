//! Error types for grounder-index.

use crate::source::SourceError;
use crate::vector::VectorStoreError;

/// Errors that can occur during indexing and retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The repository listing produced no files eligible for indexing.
    #[error("no indexable files in {repo}")]
    NoIndexableFiles { repo: String },

    /// Chunk window configuration that would never advance.
    #[error("chunk overlap {overlap} must be smaller than window size {size}")]
    InvalidChunkConfig { size: usize, overlap: usize },

    /// Repository source (listing/fetch) error.
    #[error("repository source error: {0}")]
    Source(#[from] SourceError),

    /// A worker task died; the whole job is aborted.
    #[error("indexing failed: {0}")]
    IndexingFailed(String),

    /// The bulk embed-and-store write failed; nothing was persisted.
    #[error("embedding or storage failed: {0}")]
    EmbeddingFailed(String),

    /// Vector store error outside the bulk write path.
    #[error("vector store error: {0}")]
    Store(#[from] VectorStoreError),

    /// Embedding provider error outside the bulk write path.
    #[error("LLM error: {0}")]
    Llm(#[from] grounder_llm::LlmError),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
