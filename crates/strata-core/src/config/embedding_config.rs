use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider name. Only "tfidf" ships in-tree; other names fall back to it.
    pub provider: String,
    /// Embedding dimensions.
    pub dimensions: usize,
    /// Batch size for re-indexing stream descriptions.
    pub batch_size: usize,
    /// L1 in-memory cache max entries.
    pub l1_cache_size: u64,
    /// Threads serving timeout-bounded embeddings.
    pub worker_threads: usize,
    /// Timeout-bounded embeddings admitted at once, running or queued.
    /// Further requests are rejected until one finishes.
    pub max_pending: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: defaults::DEFAULT_EMBEDDING_BATCH_SIZE,
            l1_cache_size: defaults::DEFAULT_L1_CACHE_SIZE,
            worker_threads: defaults::DEFAULT_EMBEDDING_WORKERS,
            max_pending: defaults::DEFAULT_EMBEDDING_MAX_PENDING,
        }
    }
}
