//! EmbeddingEngine: provider chain plus provider-keyed cache.

use std::collections::HashSet;
use std::sync::{mpsc, Arc, Mutex, OnceLock};
use std::time::Duration;

use strata_core::config::EmbeddingConfig;
use strata_core::errors::{EmbeddingError, StrataError, StrataResult};
use strata_core::traits::IEmbeddingProvider;
use tracing::{debug, info, warn};

use crate::cache::{provider_key, EmbeddingCache};
use crate::degradation::{DegradationChain, DegradationEvent};
use crate::embedding::Embedding;
use crate::providers::{self, HashedTfIdf};

type PendingKeys = Arc<Mutex<HashSet<String>>>;

/// Admission slot for one timeout-bounded embedding. Dropping it frees the
/// key, which happens when the worker finishes, not when the caller gives up.
struct InFlight {
    pending: PendingKeys,
    key: String,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        match self.pending.lock() {
            Ok(mut guard) => guard.remove(&self.key),
            Err(poisoned) => poisoned.into_inner().remove(&self.key),
        };
    }
}

pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: EmbeddingCache,
    config: EmbeddingConfig,
    workers: OnceLock<rayon::ThreadPool>,
    pending: PendingKeys,
}

impl EmbeddingEngine {
    /// Configured primary provider, backed by hashed TF-IDF.
    pub fn new(config: EmbeddingConfig) -> Self {
        let mut chain = DegradationChain::new();
        chain.push(providers::create_provider(&config));
        chain.push(Box::new(HashedTfIdf::new(config.dimensions)));
        Self::with_chain(config, chain)
    }

    /// Use `primary` first, falling back to hashed TF-IDF.
    pub fn with_primary(config: EmbeddingConfig, primary: Box<dyn IEmbeddingProvider>) -> Self {
        let mut chain = DegradationChain::new();
        chain.push(primary);
        chain.push(Box::new(HashedTfIdf::new(config.dimensions)));
        Self::with_chain(config, chain)
    }

    /// Use exactly the given chain.
    pub fn with_chain(config: EmbeddingConfig, chain: DegradationChain) -> Self {
        info!(
            provider = chain.active_provider_name(),
            providers = chain.len(),
            dims = config.dimensions,
            workers = config.worker_threads,
            "embedding engine initialized"
        );
        Self {
            cache: EmbeddingCache::new(config.l1_cache_size),
            chain,
            config,
            workers: OnceLock::new(),
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    pub fn active_provider(&self) -> &str {
        self.chain.active_provider_name()
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        self.chain.drain_events()
    }

    /// Timeout-bounded embeddings admitted and not yet finished.
    pub fn pending_embeddings(&self) -> usize {
        match self.pending.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Embed `text`. The cache is consulted under the active provider's
    /// name, so a vector produced by a fallback is not served once the
    /// primary answers again.
    pub fn embed_text(&self, text: &str) -> StrataResult<Embedding> {
        let key = provider_key(self.active_provider(), text);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "embedding cache hit");
            return Ok(hit);
        }
        let (vector, provider) = self.chain.embed(text)?;
        self.check_dimensions(&vector, &provider)?;
        let embedding = Embedding::new(vector, provider);
        self.cache
            .insert(provider_key(&embedding.provider, text), embedding.clone());
        Ok(embedding)
    }

    /// Embed several texts, calling the chain once for every cache miss.
    pub fn embed_texts(&self, texts: &[String]) -> StrataResult<Vec<Embedding>> {
        let active = self.active_provider().to_string();
        let mut out: Vec<Option<Embedding>> = texts
            .iter()
            .map(|t| self.cache.get(&provider_key(&active, t)))
            .collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|i| out[*i].is_none()).collect();
        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|i| texts[*i].clone()).collect();
            let (vectors, provider) = self.chain.embed_batch(&batch)?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!(
                        "{provider} returned {} vectors for {} texts",
                        vectors.len(),
                        batch.len()
                    ),
                }
                .into());
            }
            for (i, vector) in missing.into_iter().zip(vectors) {
                self.check_dimensions(&vector, &provider)?;
                let embedding = Embedding::new(vector, provider.as_str());
                self.cache
                    .insert(provider_key(&provider, &texts[i]), embedding.clone());
                out[i] = Some(embedding);
            }
        }

        out.into_iter()
            .map(|v| {
                v.ok_or_else(|| StrataError::Unknown {
                    context: "embedding batch left a slot empty".to_string(),
                })
            })
            .collect()
    }

    /// [`embed_text`](Self::embed_text) on the engine's worker pool, given up
    /// on after `timeout`.
    ///
    /// At most `max_pending` calls are admitted at once and a text already
    /// in flight is not queued twice; both are rejected immediately with
    /// [`EmbeddingError::Saturated`]. A timed-out call keeps its slot until
    /// the worker finishes, and its result still lands in the cache.
    pub fn embed_with_timeout(
        self: &Arc<Self>,
        text: &str,
        timeout: Duration,
    ) -> StrataResult<Embedding> {
        let key = provider_key(self.active_provider(), text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let slot = self.admit(key)?;
        let workers = self.workers()?;
        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(self);
        let owned = text.to_string();
        workers.spawn(move || {
            let result = engine.embed_text(&owned);
            drop(slot);
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(EmbeddingError::Timeout {
                millis: timeout.as_millis() as u64,
            }
            .into()),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EmbeddingError::InferenceFailed {
                reason: "embedding worker exited without a result".to_string(),
            }
            .into()),
        }
    }

    fn admit(&self, key: String) -> StrataResult<InFlight> {
        let mut pending = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let reason = if pending.contains(&key) {
            Some("the same text is already being embedded".to_string())
        } else if pending.len() >= self.config.max_pending {
            Some(format!("{} embeddings already pending", pending.len()))
        } else {
            None
        };
        if let Some(reason) = reason {
            warn!(pending = pending.len(), reason = %reason, "embedding rejected");
            return Err(EmbeddingError::Saturated { reason }.into());
        }
        pending.insert(key.clone());
        Ok(InFlight {
            pending: Arc::clone(&self.pending),
            key,
        })
    }

    fn workers(&self) -> StrataResult<&rayon::ThreadPool> {
        if let Some(pool) = self.workers.get() {
            return Ok(pool);
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads.max(1))
            .thread_name(|i| format!("strata-embed-{i}"))
            .build()
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("could not start embedding workers: {e}"),
            })?;
        Ok(self.workers.get_or_init(|| pool))
    }

    fn check_dimensions(&self, vector: &[f32], provider: &str) -> StrataResult<()> {
        if vector.len() != self.config.dimensions {
            debug!(provider = %provider, got = vector.len(), "embedding dimension mismatch");
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: vector.len(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(dims: usize) -> EmbeddingEngine {
        EmbeddingEngine::new(EmbeddingConfig {
            dimensions: dims,
            ..Default::default()
        })
    }

    #[test]
    fn default_chain_is_tfidf() {
        let e = engine(64);
        assert_eq!(e.active_provider(), HashedTfIdf::NAME);
        assert_eq!(e.embed_text("hello world").unwrap().len(), 64);
    }

    #[test]
    fn repeated_text_is_served_from_cache() {
        let e = engine(32);
        let a = e.embed_text("supplier invoice").unwrap();
        let b = e.embed_text("supplier invoice").unwrap();
        assert!(Arc::ptr_eq(&a.vector, &b.vector));
        assert_eq!(e.cache().entry_count(), 1);
    }

    #[test]
    fn batch_mixes_hits_and_misses() {
        let e = engine(32);
        let warm = e.embed_text("alpha").unwrap();
        let out = e
            .embed_texts(&["alpha".to_string(), "beta".to_string()])
            .unwrap();
        assert!(Arc::ptr_eq(&out[0].vector, &warm.vector));
        assert_eq!(out[1].len(), 32);
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(HashedTfIdf::new(8)));
        let e = EmbeddingEngine::with_chain(
            EmbeddingConfig {
                dimensions: 16,
                ..Default::default()
            },
            chain,
        );
        let err = e.embed_text("anything").unwrap_err();
        assert!(matches!(
            err,
            StrataError::EmbeddingError(EmbeddingError::DimensionMismatch { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn fast_embedding_beats_the_timeout() {
        let e = Arc::new(engine(32));
        let v = e
            .embed_with_timeout("ordinary text", Duration::from_secs(5))
            .unwrap();
        assert_eq!(v.len(), 32);
    }
}
