//! # strata-embeddings
//!
//! Text embeddings for similarity routing: an ordered provider chain ending
//! in a deterministic hashed TF-IDF provider, a moka cache keyed by blake3
//! hash of provider and text, timeout-bounded embedding on a fixed worker
//! pool, and the per-organization index of stream descriptions.

pub mod cache;
pub mod degradation;
mod embedding;
pub mod engine;
pub mod index;
pub mod providers;

pub use degradation::{DegradationChain, DegradationEvent};
pub use embedding::Embedding;
pub use engine::EmbeddingEngine;
pub use index::{IndexReport, SimilarityHit, SimilarityIndex};
pub use providers::HashedTfIdf;
