//! Brute-force cosine similarity store

use crate::core::ports::{VectorMetadata, VectorStore};
use crate::domain::{OptimedError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry {
    vector: Vec<f32>,
    metadata: VectorMetadata,
}

/// [`VectorStore`] that keeps every vector in a map and scans on search
///
/// The first upsert fixes the dimension; later vectors and queries must match
/// it.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Dimension shared by stored vectors, if any are stored
    pub async fn dimension(&self) -> Option<usize> {
        self.entries
            .read()
            .await
            .values()
            .next()
            .map(|e| e.vector.len())
    }
}

fn check_vector(what: &str, vector: &[f32], expected: Option<usize>) -> Result<()> {
    if vector.is_empty() {
        return Err(OptimedError::Validation(format!("{what} vector cannot be empty")));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(OptimedError::Validation(format!(
            "{what} vector contains non-finite components"
        )));
    }
    match expected {
        Some(dim) if dim != vector.len() => Err(OptimedError::Validation(format!(
            "{what} vector has dimension {}, store expects {dim}",
            vector.len()
        ))),
        _ => Ok(()),
    }
}

/// Cosine similarity; 0.0 when either vector has zero norm
///
/// Sums are accumulated in `f64` so components near `f32::MAX` do not
/// overflow the norms.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

fn matches_filter(metadata: &VectorMetadata, filter: Option<&VectorMetadata>) -> bool {
    filter.map_or(true, |f| {
        f.iter().all(|(k, v)| metadata.get(k) == Some(v))
    })
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: Option<VectorMetadata>,
    ) -> Result<()> {
        if id.trim().is_empty() {
            return Err(OptimedError::Validation("vector id cannot be empty".to_string()));
        }

        let mut entries = self.entries.write().await;

        // A lone entry being replaced does not pin the dimension.
        let expected = entries
            .iter()
            .find(|(key, _)| key.as_str() != id)
            .map(|(_, e)| e.vector.len());
        check_vector("stored", vector, expected)?;

        entries.insert(
            id.to_string(),
            Entry {
                vector: vector.to_vec(),
                metadata: metadata.unwrap_or_default(),
            },
        );

        tracing::trace!(id = id, dimension = vector.len(), "Vector upserted");
        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        top_k: usize,
        filter: Option<&VectorMetadata>,
    ) -> Result<Vec<(String, f32)>> {
        let entries = self.entries.read().await;
        let expected = entries.values().next().map(|e| e.vector.len());
        check_vector("query", query, expected)?;

        let mut scored: Vec<(String, f32)> = entries
            .iter()
            .filter(|(_, e)| matches_filter(&e.metadata, filter))
            .map(|(id, e)| (id.clone(), cosine_similarity(query, &e.vector)))
            .collect();

        scored.sort_by(|(id_a, a), (id_b, b)| {
            b.total_cmp(a).then_with(|| id_a.cmp(id_b))
        });
        scored.truncate(top_k);

        tracing::debug!(
            candidates = entries.len(),
            returned = scored.len(),
            top_k = top_k,
            "Similarity search complete"
        );
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", &[1.0, 0.0], None).await.unwrap();
        store.upsert("a", &[0.0, 1.0], None).await.unwrap();
        assert_eq!(store.len().await, 1);

        let hits = store.similarity_search(&[0.0, 1.0], 1, None).await.unwrap();
        assert_eq!(hits[0].0, "a");
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_replacing_only_entry_may_change_dimension() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", &[1.0, 0.0], None).await.unwrap();
        store.upsert("a", &[1.0, 0.0, 0.0], None).await.unwrap();
        assert_eq!(store.dimension().await, Some(3));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = InMemoryVectorStore::new();
        store.upsert("a", &[1.0, 0.0], None).await.unwrap();

        let err = store.upsert("b", &[1.0, 0.0, 0.0], None).await.unwrap_err();
        assert!(matches!(err, OptimedError::Validation(_)));

        let err = store.similarity_search(&[1.0], 5, None).await.unwrap_err();
        assert!(matches!(err, OptimedError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_vector_rejected() {
        let store = InMemoryVectorStore::new();
        assert!(store.upsert("a", &[], None).await.is_err());
        assert!(store.similarity_search(&[], 1, None).await.is_err());
    }

    #[tokio::test]
    async fn test_search_on_empty_store() {
        let store = InMemoryVectorStore::new();
        let hits = store.similarity_search(&[1.0, 2.0], 3, None).await.unwrap();
        assert!(hits.is_empty());
    }
}
