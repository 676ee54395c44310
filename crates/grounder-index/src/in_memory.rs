//! In-memory [`VectorStore`] used by tests and local development.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use crate::vector::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

struct StoredPoint {
    vector: Vec<f32>,
    payload: HashMap<String, serde_json::Value>,
}

struct InMemoryCollection {
    vector_size: u64,
    points: HashMap<String, StoredPoint>,
}

pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore").finish_non_exhaustive()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            cols.entry(collection).or_insert_with(|| InMemoryCollection {
                vector_size,
                points: HashMap::new(),
            });
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            Ok(cols.contains_key(&collection))
        })
    }

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            cols.remove(&collection);
            Ok(())
        })
    }

    fn upsert(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
            let col = cols
                .get_mut(&collection)
                .ok_or_else(|| VectorStoreError::Upsert(format!("no collection {collection}")))?;
            for point in points {
                col.points.insert(
                    point.id,
                    StoredPoint {
                        vector: point.vector,
                        payload: point.payload,
                    },
                );
            }
            Ok(())
        })
    }

    fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> BoxFuture<'_, Result<Vec<ScoredVectorPoint>, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            let Some(col) = cols.get(&collection) else {
                return Ok(Vec::new());
            };

            let actual = vector.len() as u64;
            if actual != col.vector_size {
                return Err(VectorStoreError::DimensionMismatch {
                    expected: col.vector_size,
                    actual,
                });
            }

            let mut scored: Vec<ScoredVectorPoint> = col
                .points
                .iter()
                .map(|(id, point)| ScoredVectorPoint {
                    id: id.clone(),
                    score: cosine_similarity(&vector, &point.vector),
                    payload: point.payload.clone(),
                })
                .collect();

            scored.sort_by(|a, b| b.score.total_cmp(&a.score));
            scored.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(scored)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: &str, vector: Vec<f32>) -> VectorPoint {
        VectorPoint {
            id: id.into(),
            vector,
            payload: HashMap::from([(
                "path".to_string(),
                serde_json::Value::String(format!("src/{id}.rs")),
            )]),
        }
    }

    #[tokio::test]
    async fn search_missing_collection_is_empty() {
        let store = InMemoryVectorStore::new();
        let hits = store.search("absent", vec![0.0; 4], 5).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn delete_missing_collection_is_ok() {
        let store = InMemoryVectorStore::new();
        store.delete_collection("absent").await.unwrap();
    }

    #[tokio::test]
    async fn nearest_point_ranks_first() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("c", 2).await.unwrap();
        store
            .upsert(
                "c",
                vec![point("a", vec![1.0, 0.0]), point("b", vec![0.0, 1.0])],
            )
            .await
            .unwrap();

        let hits = store.search("c", vec![0.9, 0.1], 2).await.unwrap();
        assert_eq!(hits[0].id, "a");
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("c", 2).await.unwrap();
        store
            .upsert(
                "c",
                vec![
                    point("a", vec![1.0, 0.0]),
                    point("b", vec![0.0, 1.0]),
                    point("d", vec![0.5, 0.5]),
                ],
            )
            .await
            .unwrap();

        let hits = store.search("c", vec![1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn dimension_mismatch_is_typed() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("c", 4).await.unwrap();

        let err = store.search("c", vec![0.0; 2], 5).await.unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn ensure_collection_is_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("c", 4).await.unwrap();
        store
            .upsert("c", vec![point("a", vec![0.0; 4])])
            .await
            .unwrap();
        store.ensure_collection("c", 4).await.unwrap();

        let hits = store.search("c", vec![0.1; 4], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
