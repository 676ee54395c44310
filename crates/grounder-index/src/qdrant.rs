//! Qdrant-backed [`VectorStore`] implementation.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder, vectors_config,
};

use crate::vector::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub struct QdrantVectorStore {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantVectorStore").finish_non_exhaustive()
    }
}

impl QdrantVectorStore {
    /// Connect to the Qdrant instance at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(url: &str) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    /// Read the configured vector dimensionality of a collection, when it
    /// has a single unnamed vector config.
    async fn collection_dim(&self, collection: &str) -> Result<Option<u64>, VectorStoreError> {
        let info = self
            .client
            .collection_info(collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;

        Ok(info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .and_then(|c| match c {
                vectors_config::Config::Params(params) => Some(params.size),
                vectors_config::Config::ParamsMap(_) => None,
            }))
    }
}

fn to_qdrant_payload(
    payload: HashMap<String, serde_json::Value>,
) -> Result<HashMap<String, qdrant_client::qdrant::Value>, VectorStoreError> {
    serde_json::from_value(serde_json::Value::Object(payload.into_iter().collect()))
        .map_err(|e| VectorStoreError::Serialization(e.to_string()))
}

fn from_qdrant_payload(
    payload: &HashMap<String, qdrant_client::qdrant::Value>,
) -> Result<HashMap<String, serde_json::Value>, VectorStoreError> {
    payload
        .iter()
        .map(|(k, v)| {
            serde_json::to_value(v)
                .map(|json| (k.clone(), json))
                .map_err(|e| VectorStoreError::Serialization(e.to_string()))
        })
        .collect()
}

impl VectorStore for QdrantVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let exists = self
                .client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            if exists {
                return Ok(());
            }

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&collection)
                        .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
                )
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            self.client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))
        })
    }

    fn delete_collection(&self, collection: &str) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let exists = self
                .client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            if !exists {
                return Ok(());
            }
            self.client
                .delete_collection(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
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
            let points = points
                .into_iter()
                .map(|p| {
                    to_qdrant_payload(p.payload)
                        .map(|payload| PointStruct::new(p.id, p.vector, payload))
                })
                .collect::<Result<Vec<_>, _>>()?;

            self.client
                .upsert_points(UpsertPointsBuilder::new(&collection, points))
                .await
                .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
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
            let exists = self
                .client
                .collection_exists(&collection)
                .await
                .map_err(|e| VectorStoreError::Collection(e.to_string()))?;
            if !exists {
                return Ok(Vec::new());
            }

            let actual = u64::try_from(vector.len())
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;
            if let Some(expected) = self.collection_dim(&collection).await?
                && expected != actual
            {
                return Err(VectorStoreError::DimensionMismatch { expected, actual });
            }

            let results = self
                .client
                .search_points(
                    SearchPointsBuilder::new(&collection, vector, limit).with_payload(true),
                )
                .await
                .map_err(|e| VectorStoreError::Search(e.to_string()))?;

            results
                .result
                .into_iter()
                .map(|point| {
                    let id = point
                        .id
                        .as_ref()
                        .and_then(|id| id.point_id_options.as_ref())
                        .map(|options| match options {
                            qdrant_client::qdrant::point_id::PointIdOptions::Num(n) => {
                                n.to_string()
                            }
                            qdrant_client::qdrant::point_id::PointIdOptions::Uuid(u) => u.clone(),
                        })
                        .unwrap_or_default();
                    from_qdrant_payload(&point.payload).map(|payload| ScoredVectorPoint {
                        id,
                        score: point.score,
                        payload,
                    })
                })
                .collect()
        })
    }
}
