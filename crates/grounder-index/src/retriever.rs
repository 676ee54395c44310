//! Retrieval merge engine: two similarity queries, one deduplicated result.
//!
//! Alongside the verbatim user query, a schema-biased variant runs so that
//! data-model chunks surface even when the user's phrasing never mentions
//! them.

use grounder_llm::LlmProvider;

use crate::error::{IndexError, Result};
use crate::store::{RepoVectorStore, RetrievedChunk};
use crate::vector::VectorStoreError;

const TOP_K: u64 = 6;
const TOP_K_SCHEMA: u64 = 4;
const SCHEMA_KEYWORDS: &str = "schema tables database prisma migration sql column";

/// Grounding-context retriever over a repository namespace.
pub struct ContextRetriever<P> {
    store: RepoVectorStore<P>,
}

impl<P: LlmProvider> ContextRetriever<P> {
    pub fn new(store: RepoVectorStore<P>) -> Self {
        Self { store }
    }

    /// Retrieve the deduplicated chunk set grounding a generation prompt.
    ///
    /// Primary matches order before secondary-only matches; duplicates are
    /// collapsed by `path:start-end`. A dimension mismatch (the embedding
    /// model changed since the namespace was built) resets the namespace
    /// and yields an empty set so the caller proceeds ungrounded.
    ///
    /// # Errors
    ///
    /// Returns an error when embedding or the store fails for any other
    /// reason.
    pub async fn retrieve(&self, repo: &str, query: &str) -> Result<Vec<RetrievedChunk>> {
        let Some(primary) = self.search_or_heal(repo, query, TOP_K).await? else {
            return Ok(Vec::new());
        };

        let boosted = format!("{query} {SCHEMA_KEYWORDS}");
        let Some(secondary) = self.search_or_heal(repo, &boosted, TOP_K_SCHEMA).await? else {
            return Ok(Vec::new());
        };

        let mut seen = std::collections::HashSet::new();
        let merged: Vec<RetrievedChunk> = primary
            .into_iter()
            .chain(secondary)
            .filter(|chunk| seen.insert(chunk.key()))
            .collect();

        tracing::debug!(repo, chunks = merged.len(), "context retrieved");
        Ok(merged)
    }

    /// One similarity search; `None` means the namespace was stale and has
    /// been reset.
    async fn search_or_heal(
        &self,
        repo: &str,
        query: &str,
        k: u64,
    ) -> Result<Option<Vec<RetrievedChunk>>> {
        match self.store.search(repo, query, k).await {
            Ok(hits) => Ok(Some(hits)),
            Err(IndexError::Store(VectorStoreError::DimensionMismatch { expected, actual })) => {
                tracing::warn!(
                    repo,
                    expected,
                    actual,
                    "embedding dimension changed, resetting namespace"
                );
                self.store.reset(repo).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use grounder_llm::LlmError;
    use grounder_llm::mock::MockProvider;
    use grounder_llm::provider::Message;

    use super::*;
    use crate::chunker::TextChunk;
    use crate::in_memory::InMemoryVectorStore;
    use crate::store::namespace_for;
    use crate::vector::VectorStore;

    /// Embeds text as keyword counts so queries rank predictably:
    /// dim 0 counts "alpha", dim 1 counts schema-flavoured words.
    #[derive(Debug, Clone)]
    struct KeywordEmbedder;

    impl LlmProvider for KeywordEmbedder {
        async fn chat(&self, _messages: &[Message]) -> std::result::Result<String, LlmError> {
            Ok(String::new())
        }

        #[allow(clippy::cast_precision_loss)]
        async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, LlmError> {
            let alpha = text.matches("alpha").count() as f32;
            let schema = ["schema", "sql", "migration", "database"]
                .iter()
                .map(|w| text.matches(w).count())
                .sum::<usize>() as f32;
            Ok(vec![alpha + 0.1, schema + 0.1])
        }

        fn supports_embeddings(&self) -> bool {
            true
        }

        #[allow(clippy::unnecessary_literal_bound)]
        fn name(&self) -> &str {
            "keyword"
        }
    }

    fn chunk(path: &str, content: &str) -> TextChunk {
        TextChunk {
            id: format!("{path}:1-1"),
            path: path.into(),
            start_line: 1,
            end_line: 1,
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn overlapping_results_are_deduplicated() {
        let store = RepoVectorStore::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(MockProvider::default()),
        );
        store
            .add(
                "octo/repo",
                &[chunk("a.rs", "one"), chunk("b.rs", "two"), chunk("c.rs", "three")],
            )
            .await
            .unwrap();

        let retriever = ContextRetriever::new(store);
        let chunks = retriever.retrieve("octo/repo", "query").await.unwrap();

        // both searches return the same three documents; dedup collapses them
        assert_eq!(chunks.len(), 3);
        let mut keys: Vec<String> = chunks.iter().map(RetrievedChunk::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 3);
    }

    #[tokio::test]
    async fn primary_matches_order_before_secondary_only_matches() {
        let store = RepoVectorStore::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(KeywordEmbedder),
        );

        // six alpha-flavoured chunks fill the primary k=6; the schema chunk
        // only surfaces through the boosted query
        let mut chunks: Vec<TextChunk> = (0..6)
            .map(|i| chunk(&format!("src/alpha{i}.rs"), "alpha function body"))
            .collect();
        chunks.push(chunk("db/schema.sql", "database schema migration"));
        store.add("octo/repo", &chunks).await.unwrap();

        let retriever = ContextRetriever::new(store);
        let result = retriever.retrieve("octo/repo", "alpha").await.unwrap();

        assert_eq!(result.len(), 7);
        for hit in &result[..6] {
            assert!(hit.path.starts_with("src/alpha"), "unexpected {}", hit.path);
        }
        assert_eq!(result[6].path, "db/schema.sql");
    }

    #[tokio::test]
    async fn unindexed_repo_retrieves_nothing() {
        let store = RepoVectorStore::new(
            Arc::new(InMemoryVectorStore::new()),
            Arc::new(MockProvider::default()),
        );
        let retriever = ContextRetriever::new(store);
        let chunks = retriever.retrieve("never/indexed", "query").await.unwrap();
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn dimension_mismatch_resets_namespace_and_returns_empty() {
        let inner: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());

        // namespace built with 8-dimensional embeddings
        let writer = RepoVectorStore::new(
            Arc::clone(&inner),
            Arc::new(MockProvider::with_embedding_dim(8)),
        );
        writer
            .add("octo/repo", &[chunk("a.rs", "content")])
            .await
            .unwrap();

        // the query side now embeds into 4 dimensions
        let reader = RepoVectorStore::new(
            Arc::clone(&inner),
            Arc::new(MockProvider::with_embedding_dim(4)),
        );
        let retriever = ContextRetriever::new(reader.clone());

        let chunks = retriever.retrieve("octo/repo", "query").await.unwrap();
        assert!(chunks.is_empty());
        assert!(
            !inner
                .collection_exists(&namespace_for("octo/repo"))
                .await
                .unwrap()
        );

        // the repository can be rebuilt with the new model immediately
        reader
            .add("octo/repo", &[chunk("a.rs", "content")])
            .await
            .unwrap();
        let chunks = retriever.retrieve("octo/repo", "query").await.unwrap();
        assert_eq!(chunks.len(), 1);
    }
}
