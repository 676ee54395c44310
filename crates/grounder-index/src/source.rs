//! Repository source seam: file listing and content fetch.
//!
//! The indexing orchestrator consumes this trait; the GitHub implementation
//! lives in `grounder-github`. The trait is object-safe so the gateway can
//! hold a `dyn RepoSource` without generics.

use std::future::Future;
use std::pin::Pin;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One indexable blob at the repository head. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoFile {
    pub path: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}

pub trait RepoSource: Send + Sync {
    /// List candidate files for a repository, ranked by relevance and
    /// already filtered by extension, path prefix, and size.
    ///
    /// A non-success listing response yields an empty list, not an error.
    fn list_files(
        &self,
        token: &str,
        repo: &str,
    ) -> BoxFuture<'_, Result<Vec<RepoFile>, SourceError>>;

    /// Fetch a file's text content.
    ///
    /// A non-success response yields an empty string; only transport
    /// failures surface as errors, and the orchestrator treats those as
    /// zero chunks for the file.
    fn fetch_content(
        &self,
        token: &str,
        file: &RepoFile,
    ) -> BoxFuture<'_, Result<String, SourceError>>;
}
