//! Per-repository vector namespace adapter.
//!
//! Maps a repository identifier to a stable collection name, owns the
//! embed-then-upsert write path and the embed-then-search read path.

use std::collections::HashMap;
use std::sync::Arc;

use grounder_llm::LlmProvider;

use crate::chunker::TextChunk;
use crate::error::{IndexError, Result};
use crate::vector::{VectorPoint, VectorStore};

/// A chunk read back from storage. Structurally a [`TextChunk`] minus the
/// derived id, sourced from a namespace rather than authored fresh.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetrievedChunk {
    pub content: String,
    pub path: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl RetrievedChunk {
    fn from_payload(payload: &HashMap<String, serde_json::Value>) -> Option<Self> {
        let get_str = |key: &str| payload.get(key).and_then(|v| v.as_str()).map(String::from);
        let get_line = |key: &str| {
            payload
                .get(key)
                .and_then(serde_json::Value::as_u64)
                .and_then(|v| usize::try_from(v).ok())
        };

        Some(Self {
            content: get_str("content")?,
            path: get_str("path")?,
            start_line: get_line("start_line")?,
            end_line: get_line("end_line")?,
        })
    }

    /// Deduplication key: `path:start-end`.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}:{}-{}", self.path, self.start_line, self.end_line)
    }
}

/// Derive the collection name for a repository identifier.
///
/// Deterministic and filesystem-safe: every non-alphanumeric byte becomes
/// an underscore.
#[must_use]
pub fn namespace_for(repo: &str) -> String {
    let sanitized: String = repo
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("repo_{sanitized}")
}

/// Vector store scoped to per-repository namespaces.
pub struct RepoVectorStore<P> {
    store: Arc<dyn VectorStore>,
    provider: Arc<P>,
}

impl<P> Clone for RepoVectorStore<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P> std::fmt::Debug for RepoVectorStore<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoVectorStore").finish_non_exhaustive()
    }
}

impl<P: LlmProvider> RepoVectorStore<P> {
    pub fn new(store: Arc<dyn VectorStore>, provider: Arc<P>) -> Self {
        Self { store, provider }
    }

    /// Irreversibly drop the repository's namespace. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    pub async fn reset(&self, repo: &str) -> Result<()> {
        let namespace = namespace_for(repo);
        self.store.delete_collection(&namespace).await?;
        tracing::debug!(repo, namespace, "namespace reset");
        Ok(())
    }

    /// Embed and persist a batch of chunks into the repository's namespace.
    ///
    /// The collection is created lazily, sized from the first embedding.
    /// All points are written in a single upsert, so a failure anywhere
    /// leaves nothing persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or the upsert fails.
    pub async fn add(&self, repo: &str, chunks: &[TextChunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let namespace = namespace_for(repo);
        let mut points = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let vector = self.provider.embed(&chunk.content).await?;
            let payload: HashMap<String, serde_json::Value> = HashMap::from([
                ("content".to_string(), chunk.content.clone().into()),
                ("path".to_string(), chunk.path.clone().into()),
                ("start_line".to_string(), chunk.start_line.into()),
                ("end_line".to_string(), chunk.end_line.into()),
            ]);
            points.push(VectorPoint {
                id: uuid::Uuid::new_v4().to_string(),
                vector,
                payload,
            });
        }

        let vector_size = u64::try_from(points[0].vector.len())
            .map_err(|e| IndexError::EmbeddingFailed(e.to_string()))?;
        self.store
            .ensure_collection(&namespace, vector_size)
            .await?;

        let count = points.len();
        self.store.upsert(&namespace, points).await?;
        tracing::debug!(repo, namespace, count, "chunks stored");
        Ok(count)
    }

    /// Embed the query and return the `k` nearest stored chunks.
    ///
    /// A repository that was never indexed returns an empty result.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or the search fails; a
    /// [`crate::vector::VectorStoreError::DimensionMismatch`] surfaces as
    /// [`IndexError::Store`] for the caller to recover from.
    pub async fn search(&self, repo: &str, query: &str, k: u64) -> Result<Vec<RetrievedChunk>> {
        let namespace = namespace_for(repo);
        let vector = self.provider.embed(query).await?;
        let hits = self.store.search(&namespace, vector, k).await?;

        Ok(hits
            .iter()
            .filter_map(|hit| RetrievedChunk::from_payload(&hit.payload))
            .collect())
    }
}
