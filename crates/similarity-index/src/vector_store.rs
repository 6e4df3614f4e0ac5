//! In-memory vector storage. "One vector per alert_id; re-indexing an
//! alert overwrites its prior embedding" (§4.8 invariant).

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::similarity::cosine_similarity;

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub alert_id: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, record: VectorRecord);

    /// Unordered candidates and their similarity to `query`; the caller
    /// (the similarity index facade) sorts, thresholds and limits.
    async fn search(&self, query: &[f32]) -> Vec<ScoredRecord>;

    async fn len(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    records: DashMap<String, VectorRecord>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, record: VectorRecord) {
        self.records.insert(record.alert_id.clone(), record);
    }

    async fn search(&self, query: &[f32]) -> Vec<ScoredRecord> {
        self.records
            .iter()
            .map(|entry| {
                let record = entry.value().clone();
                let similarity = cosine_similarity(query, &record.embedding);
                ScoredRecord { record, similarity }
            })
            .collect()
    }

    async fn len(&self) -> usize {
        self.records.len()
    }
}
