//! GitHub implementation of the grounder repository source.
//!
//! Lists indexable blobs from the git tree API with relevance ranking,
//! fetches raw file contents, and gathers repository metadata for prompt
//! enrichment. Every fetch degrades gracefully: listing failures yield an
//! empty list, content failures yield empty text.

pub mod client;
pub mod context;

pub use client::GithubClient;
pub use context::RepoContext;
