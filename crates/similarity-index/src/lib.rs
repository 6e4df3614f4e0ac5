//! Alertmesh Similarity Index: fixed-dimensionality embedding, in-memory
//! vector storage and threshold-bounded k-NN search (§4.8). A library
//! consulted synchronously by the AI Triage Agent, not a standalone
//! broker-consuming stage.

pub mod embedder;
pub mod filter;
pub mod index;
pub mod similarity;
pub mod vector_store;

pub use embedder::{Embedder, HashingEmbedder};
pub use filter::MetadataFilter;
pub use index::{SearchHit, SimilarityIndex};
pub use similarity::cosine_similarity;
pub use vector_store::{InMemoryVectorStore, ScoredRecord, VectorRecord, VectorStore};
