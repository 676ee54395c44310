//! Vector store abstraction over per-repository namespaces.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("collection error: {0}")]
    Collection(String),

    #[error("upsert error: {0}")]
    Upsert(String),

    #[error("search error: {0}")]
    Search(String),

    /// The query vector's dimensionality differs from the collection's
    /// configured dimensionality (the embedding model changed after the
    /// collection was created). Recoverable: callers reset the namespace
    /// and treat the repository as un-indexed.
    #[error("dimension mismatch: collection expects {expected}, query has {actual}")]
    DimensionMismatch { expected: u64, actual: u64 },

    #[error("serialization error: {0}")]
    Serialization(String),
}

#[derive(Debug, Clone)]
pub struct VectorPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct ScoredVectorPoint {
    pub id: String,
    pub score: f32,
    pub payload: HashMap<String, serde_json::Value>,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    /// Create the collection if absent, configured for `vector_size`
    /// dimensions. Idempotent.
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>>;

    /// Drop a collection. Dropping a non-existent collection is not an error.
    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Nearest-neighbour search. Searching a missing collection returns an
    /// empty result. Fails with [`VectorStoreError::DimensionMismatch`] when
    /// the query dimensionality differs from the collection's.
    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>>;
}
