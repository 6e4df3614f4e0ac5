//! `SimilarityIndex`: the facade consulted synchronously by the AI
//! Triage Agent (§4.7, §4.8).

use std::collections::HashMap;

use serde_json::Value;

use crate::embedder::Embedder;
use crate::filter::MetadataFilter;
use crate::vector_store::{VectorRecord, VectorStore};

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub alert_id: String,
    pub similarity: f32,
    pub metadata: HashMap<String, Value>,
}

pub struct SimilarityIndex {
    embedder: Box<dyn Embedder>,
    store: Box<dyn VectorStore>,
}

impl SimilarityIndex {
    pub fn new(embedder: Box<dyn Embedder>, store: Box<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Embeds `text`, upserts under `alert_id`, replacing any prior
    /// embedding for the same alert.
    pub async fn index(&self, alert_id: &str, text: &str, metadata: HashMap<String, Value>) -> String {
        let embedding = self.embedder.embed(text).await;
        self.store
            .upsert(VectorRecord {
                alert_id: alert_id.to_string(),
                embedding,
                metadata,
            })
            .await;
        alert_id.to_string()
    }

    /// Embeds `text`, scores every indexed record, drops results below
    /// `threshold`, applies `filter`, sorts by descending similarity and
    /// truncates to `k`.
    pub async fn search(
        &self,
        text: &str,
        k: usize,
        threshold: f32,
        filter: Option<&MetadataFilter>,
    ) -> Vec<SearchHit> {
        let query = self.embedder.embed(text).await;
        let mut candidates = self.store.search(&query).await;
        candidates.retain(|c| c.similarity >= threshold);
        if let Some(filter) = filter {
            candidates.retain(|c| filter.matches(&c.record.metadata));
        }
        candidates.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal));
        candidates
            .into_iter()
            .take(k)
            .map(|c| SearchHit {
                alert_id: c.record.alert_id,
                similarity: c.similarity,
                metadata: c.record.metadata,
            })
            .collect()
    }
}
