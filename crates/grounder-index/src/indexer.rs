//! Indexing orchestrator: list → fetch → chunk → embed → store.
//!
//! Every reindex is a full rebuild of the repository's namespace. Files
//! are processed by a fixed-width worker pool pulling indices from a
//! shared cursor; per-file fetch failures are absorbed, pool-level
//! failures abort the job.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use tokio::task::JoinSet;

use grounder_llm::LlmProvider;

use crate::chunker::{Chunker, ChunkerConfig, TextChunk};
use crate::error::{IndexError, Result};
use crate::progress::ProgressTracker;
use crate::source::RepoSource;
use crate::store::RepoVectorStore;

const DEFAULT_CONCURRENCY: usize = 3;

/// Indexer configuration.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Worker pool width.
    pub concurrency: usize,
    pub chunker: ChunkerConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            chunker: ChunkerConfig::default(),
        }
    }
}

/// Orchestrates full-rebuild indexing jobs for one repository at a time.
pub struct RepoIndexer<P> {
    source: Arc<dyn RepoSource>,
    store: RepoVectorStore<P>,
    progress: ProgressTracker,
    config: IndexerConfig,
}

impl<P: LlmProvider + 'static> RepoIndexer<P> {
    pub fn new(
        source: Arc<dyn RepoSource>,
        store: RepoVectorStore<P>,
        progress: ProgressTracker,
        config: IndexerConfig,
    ) -> Self {
        Self {
            source,
            store,
            progress,
            config,
        }
    }

    /// Rebuild the repository's namespace from its currently eligible files.
    ///
    /// Returns the number of chunks indexed.
    ///
    /// # Errors
    ///
    /// Fails with [`IndexError::NoIndexableFiles`] when the listing is
    /// empty, [`IndexError::IndexingFailed`] when a worker dies, and
    /// [`IndexError::EmbeddingFailed`] when the bulk write fails. Progress
    /// state is cleared on every terminal outcome.
    pub async fn reindex(&self, token: &str, repo: &str) -> Result<usize> {
        let chunker = Chunker::new(self.config.chunker.clone())?;

        let files = self.source.list_files(token, repo).await?;
        tracing::info!(repo, files = files.len(), "reindex started");

        if files.is_empty() {
            return Err(IndexError::NoIndexableFiles { repo: repo.into() });
        }

        // Full rebuild: previously indexed content becomes unavailable now.
        self.store.reset(repo).await?;
        self.progress.start(repo, files.len());

        let files = Arc::new(files);
        let cursor = Arc::new(AtomicUsize::new(0));
        let buffer: Arc<Mutex<Vec<TextChunk>>> = Arc::new(Mutex::new(Vec::new()));
        let workers = self.config.concurrency.clamp(1, files.len());

        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let source = Arc::clone(&self.source);
            let files = Arc::clone(&files);
            let cursor = Arc::clone(&cursor);
            let buffer = Arc::clone(&buffer);
            let progress = self.progress.clone();
            let chunker = chunker.clone();
            let token = token.to_string();
            let repo = repo.to_string();

            pool.spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= files.len() {
                        break;
                    }
                    let file = &files[index];

                    match source.fetch_content(&token, file).await {
                        Ok(content) if !content.trim().is_empty() => {
                            let chunks = chunker.chunk(&file.path, &content);
                            if !chunks.is_empty() {
                                tracing::debug!(
                                    repo,
                                    path = %file.path,
                                    chunks = chunks.len(),
                                    "file chunked"
                                );
                                buffer.lock().await.extend(chunks);
                            }
                        }
                        Ok(_) => {
                            tracing::debug!(repo, path = %file.path, "empty content, skipped");
                        }
                        Err(e) => {
                            tracing::warn!(repo, path = %file.path, error = %e, "fetch failed");
                        }
                    }

                    // Progress counts files attempted, not files that
                    // yielded chunks.
                    progress.record_processed(&repo);
                }
            });
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                tracing::error!(repo, error = %e, "worker died, aborting job");
                self.progress.clear(repo);
                return Err(IndexError::IndexingFailed(e.to_string()));
            }
        }

        let chunks = std::mem::take(&mut *buffer.lock().await);
        let indexed = match self.store.add(repo, &chunks).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(repo, error = %e, "bulk write failed");
                self.progress.clear(repo);
                return Err(IndexError::EmbeddingFailed(e.to_string()));
            }
        };

        self.progress.clear(repo);
        tracing::info!(repo, indexed, "reindex complete");
        Ok(indexed)
    }
}
