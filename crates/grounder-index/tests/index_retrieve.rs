//! End-to-end indexing and retrieval over the in-memory vector store.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use grounder_index::chunker::ChunkerConfig;
use grounder_index::in_memory::InMemoryVectorStore;
use grounder_index::indexer::{IndexerConfig, RepoIndexer};
use grounder_index::progress::ProgressTracker;
use grounder_index::retriever::ContextRetriever;
use grounder_index::source::{RepoFile, RepoSource, SourceError};
use grounder_index::store::RepoVectorStore;
use grounder_llm::mock::MockProvider;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

struct FixtureSource {
    contents: HashMap<String, String>,
}

impl FixtureSource {
    fn new(contents: &[(&str, &str)]) -> Self {
        Self {
            contents: contents
                .iter()
                .map(|(p, c)| ((*p).to_string(), (*c).to_string()))
                .collect(),
        }
    }
}

impl RepoSource for FixtureSource {
    fn list_files(
        &self,
        _token: &str,
        _repo: &str,
    ) -> BoxFuture<'_, Result<Vec<RepoFile>, SourceError>> {
        let files = self
            .contents
            .iter()
            .map(|(path, content)| RepoFile {
                path: path.clone(),
                size: content.len() as u64,
                url: format!("https://example.test/{path}"),
            })
            .collect();
        Box::pin(async move { Ok(files) })
    }

    fn fetch_content(
        &self,
        _token: &str,
        file: &RepoFile,
    ) -> BoxFuture<'_, Result<String, SourceError>> {
        let content = self.contents.get(&file.path).cloned().unwrap_or_default();
        Box::pin(async move { Ok(content) })
    }
}

#[tokio::test]
async fn reindex_then_retrieve_grounds_a_query() {
    let source = Arc::new(FixtureSource::new(&[
        ("README.md", "# demo\nA service that drafts issues."),
        ("src/lib.rs", "pub mod api;\npub mod db;"),
        ("db/schema.sql", "CREATE TABLE issues (id SERIAL);"),
    ]));
    let store = RepoVectorStore::new(
        Arc::new(InMemoryVectorStore::new()),
        Arc::new(MockProvider::default()),
    );
    let progress = ProgressTracker::new();
    let indexer = RepoIndexer::new(
        source,
        store.clone(),
        progress.clone(),
        IndexerConfig {
            concurrency: 2,
            chunker: ChunkerConfig::default(),
        },
    );

    let indexed = indexer.reindex("token", "octo/demo").await.unwrap();
    assert_eq!(indexed, 3);
    assert!(progress.get("octo/demo").is_none());

    let retriever = ContextRetriever::new(store);
    let chunks = retriever
        .retrieve("octo/demo", "add a column to issues")
        .await
        .unwrap();

    assert_eq!(chunks.len(), 3);
    let paths: Vec<&str> = chunks.iter().map(|c| c.path.as_str()).collect();
    assert!(paths.contains(&"db/schema.sql"));
    for chunk in &chunks {
        assert!(chunk.start_line >= 1);
        assert!(chunk.start_line <= chunk.end_line);
        assert!(!chunk.content.is_empty());
    }
}
