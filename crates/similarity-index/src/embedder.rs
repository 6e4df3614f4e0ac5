//! Embedding generation. "Embedding dimensionality and distance metric are
//! fixed at deployment; changing them invalidates the index" (§4.8), so
//! the trait exposes `dimensionality()` rather than letting it vary
//! per-call.

use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    fn dimensionality(&self) -> usize;

    async fn embed(&self, text: &str) -> Vec<f32>;
}

/// A deterministic, dependency-free stand-in for a real embedding model:
/// a hashed bag-of-words projected into a fixed-size vector and
/// L2-normalized. Deterministic so the round-trip law (index then search
/// with the same text returns similarity 1.0) holds without a real model.
pub struct HashingEmbedder {
    dimensionality: usize,
}

impl HashingEmbedder {
    pub fn new(dimensionality: usize) -> Self {
        Self { dimensionality: dimensionality.max(1) }
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn dimensionality(&self) -> usize {
        self.dimensionality
    }

    async fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensionality];
        for token in text.split_whitespace() {
            let bucket = token_hash(token) as usize % self.dimensionality;
            vector[bucket] += 1.0;
        }
        normalize(&mut vector);
        vector
    }
}

fn token_hash(token: &str) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    token.to_ascii_lowercase().hash(&mut hasher);
    hasher.finish()
}

fn normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
