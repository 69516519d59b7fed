//! Tests for the in-process KPI sink and vector store through their ports

use optimed::adapters::memory::{InMemoryKpiSink, InMemoryVectorStore};
use optimed::core::ports::{KpiEventSink, VectorMetadata, VectorStore};
use optimed::domain::KpiEvent;
use std::sync::Arc;

fn meta(pairs: &[(&str, &str)]) -> VectorMetadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_kpi_sink_concurrent_record_then_flush() {
    let sink = Arc::new(InMemoryKpiSink::new());

    let tasks: Vec<_> = (0..10u32)
        .map(|i| {
            let sink = Arc::clone(&sink);
            tokio::spawn(async move {
                let event = KpiEvent::builder()
                    .metric("bed_idle_minutes")
                    .value(f64::from(i))
                    .unit("min")
                    .build()
                    .unwrap();
                sink.record(event).await.unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(sink.pending().await, 10);
    assert!(sink.flushed().await.is_empty());

    sink.flush().await.unwrap();
    assert_eq!(sink.pending().await, 0);
    assert_eq!(sink.flushed().await.len(), 10);

    // A second flush with nothing pending changes nothing
    sink.flush().await.unwrap();
    assert_eq!(sink.flushed().await.len(), 10);
}

#[tokio::test]
async fn test_vector_store_ranking_and_top_k() {
    let store = InMemoryVectorStore::new();
    store.upsert("north", &[0.0, 1.0], None).await.unwrap();
    store.upsert("east", &[1.0, 0.0], None).await.unwrap();
    store.upsert("north-east", &[1.0, 1.0], None).await.unwrap();
    store.upsert("zero", &[0.0, 0.0], None).await.unwrap();

    let hits = store.similarity_search(&[1.0, 0.1], 4, None).await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["east", "north-east", "north", "zero"]);
    assert_eq!(hits[3].1, 0.0);
    assert!(hits.windows(2).all(|w| w[0].1 >= w[1].1));

    let top = store.similarity_search(&[1.0, 0.1], 2, None).await.unwrap();
    assert_eq!(top.len(), 2);

    let none = store.similarity_search(&[1.0, 0.1], 0, None).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_vector_store_ties_broken_by_id() {
    let store = InMemoryVectorStore::new();
    store.upsert("b", &[2.0, 0.0], None).await.unwrap();
    store.upsert("a", &[1.0, 0.0], None).await.unwrap();
    store.upsert("c", &[3.0, 0.0], None).await.unwrap();

    let hits = store.similarity_search(&[1.0, 0.0], 3, None).await.unwrap();
    let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_vector_store_metadata_filter() {
    let store = InMemoryVectorStore::new();
    store
        .upsert("note-1", &[1.0, 0.0], Some(meta(&[("unit", "ICU"), ("kind", "note")])))
        .await
        .unwrap();
    store
        .upsert("note-2", &[1.0, 0.0], Some(meta(&[("unit", "Ward A"), ("kind", "note")])))
        .await
        .unwrap();
    store.upsert("bare", &[1.0, 0.0], None).await.unwrap();

    let filter = meta(&[("unit", "ICU")]);
    let hits = store
        .similarity_search(&[1.0, 0.0], 10, Some(&filter))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, "note-1");

    let filter = meta(&[("kind", "note")]);
    let hits = store
        .similarity_search(&[1.0, 0.0], 10, Some(&filter))
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);

    let empty = VectorMetadata::new();
    let hits = store
        .similarity_search(&[1.0, 0.0], 10, Some(&empty))
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_vector_store_dimension_is_fixed() {
    let store = InMemoryVectorStore::new();
    store.upsert("a", &[1.0, 0.0, 0.0], None).await.unwrap();
    store.upsert("b", &[0.0, 1.0, 0.0], None).await.unwrap();

    assert!(store.upsert("c", &[1.0, 0.0], None).await.is_err());
    assert!(store.upsert("a", &[1.0, 0.0], None).await.is_err());
    assert_eq!(store.dimension().await, Some(3));
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_vector_store_large_components_keep_direction() {
    let store = InMemoryVectorStore::new();
    store.upsert("a-huge", &[1e20, 0.0], None).await.unwrap();
    store.upsert("b-ortho", &[0.0, 1.0], None).await.unwrap();
    store.upsert("c-same", &[1.0, 0.0], None).await.unwrap();

    let hits = store.similarity_search(&[1.0, 0.0], 3, None).await.unwrap();
    let scores: Vec<(&str, f32)> = hits.iter().map(|(id, s)| (id.as_str(), *s)).collect();

    assert!((scores[0].1 - 1.0).abs() < 1e-6);
    assert!((scores[1].1 - 1.0).abs() < 1e-6);
    assert_eq!(
        [scores[0].0, scores[1].0],
        ["a-huge", "c-same"],
        "same-direction vectors tie and are ordered by id"
    );
    assert_eq!(scores[2], ("b-ortho", 0.0));
}
