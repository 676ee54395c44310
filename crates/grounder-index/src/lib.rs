//! Per-repository semantic indexing and retrieval.
//!
//! Provides the grounding pipeline: repository files are selected and
//! fetched through a [`source::RepoSource`], split into overlapping
//! line-addressed chunks, embedded and stored in a per-repository vector
//! namespace, and later retrieved (with a schema-biased secondary query)
//! to ground issue generation.

pub mod chunker;
pub mod error;
pub mod in_memory;
pub mod indexer;
pub mod progress;
pub mod qdrant;
pub mod retriever;
pub mod source;
pub mod store;
pub mod vector;

pub use error::{IndexError, Result};
