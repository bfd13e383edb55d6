//! Stream-description similarity index.
//!
//! Each stream's [`Stream::index_text`] is embedded and stored through
//! [`IVectorIndexStorage`] together with a content hash and the name of the
//! provider that produced it, so re-indexing an unchanged stream costs one
//! hash lookup. Archived streams are removed. Queries only compare against
//! vectors of the provider that embedded the query.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{Stream, StreamStatus};
use strata_core::traits::IVectorIndexStorage;
use tracing::{debug, info, warn};

use crate::cache::content_key;
use crate::engine::EmbeddingEngine;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityHit {
    pub stream_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub indexed: usize,
    pub unchanged: usize,
    pub removed: usize,
}

pub struct SimilarityIndex {
    engine: Arc<EmbeddingEngine>,
    store: Arc<dyn IVectorIndexStorage>,
}

impl SimilarityIndex {
    pub fn new(engine: Arc<EmbeddingEngine>, store: Arc<dyn IVectorIndexStorage>) -> Self {
        Self { engine, store }
    }

    pub fn engine(&self) -> &Arc<EmbeddingEngine> {
        &self.engine
    }

    /// Stored hash for a stream: provider, dimensions and indexed text, so a
    /// provider or dimension change forces a re-embed.
    fn stored_hash(&self, provider: &str, text: &str) -> String {
        content_key(&format!(
            "{provider}:{}:{text}",
            self.engine.config().dimensions
        ))
    }

    /// Index one stream. Returns `true` when a new embedding was written.
    pub fn index_stream(&self, stream: &Stream) -> StrataResult<bool> {
        let report = self.index_streams(std::slice::from_ref(stream))?;
        Ok(report.indexed == 1)
    }

    /// Index many streams, embedding the changed ones in `batch_size` chunks.
    pub fn index_streams(&self, streams: &[Stream]) -> StrataResult<IndexReport> {
        let mut report = IndexReport::default();
        let mut stale: Vec<&Stream> = Vec::new();
        let active = self.engine.active_provider().to_string();

        for stream in streams {
            if stream.status == StreamStatus::Archived {
                if self.store.stream_embedding_hash(&stream.id)?.is_some() {
                    self.store.remove_stream_embedding(&stream.id)?;
                    report.removed += 1;
                }
                continue;
            }
            let hash = self.stored_hash(&active, &stream.index_text());
            if self.store.stream_embedding_hash(&stream.id)?.as_deref() == Some(hash.as_str()) {
                report.unchanged += 1;
            } else {
                stale.push(stream);
            }
        }

        for chunk in stale.chunks(self.engine.config().batch_size.max(1)) {
            let texts: Vec<String> = chunk.iter().map(|s| s.index_text()).collect();
            let embeddings = self.engine.embed_texts(&texts)?;
            for ((stream, text), embedding) in chunk.iter().zip(&texts).zip(embeddings) {
                let hash = self.stored_hash(&embedding.provider, text);
                self.store.upsert_stream_embedding(
                    &stream.id,
                    &stream.organization_id,
                    &embedding.provider,
                    &hash,
                    embedding.as_slice(),
                )?;
                report.indexed += 1;
            }
        }

        if report.indexed + report.removed > 0 {
            info!(
                indexed = report.indexed,
                unchanged = report.unchanged,
                removed = report.removed,
                "similarity index updated"
            );
        }
        Ok(report)
    }

    pub fn remove_stream(&self, stream_id: &str) -> StrataResult<()> {
        self.store.remove_stream_embedding(stream_id)
    }

    /// Streams of `organization_id` closest to `text`, best first.
    ///
    /// Embedding is bounded by `timeout`; a slow or failing provider
    /// surfaces as an embedding error for the caller to absorb. When the
    /// organization's index holds no vectors from the provider that embedded
    /// the query, the search fails with `ExternalServiceUnavailable` rather
    /// than comparing vectors from different spaces.
    pub fn search(
        &self,
        organization_id: &str,
        text: &str,
        top_k: usize,
        timeout: Duration,
    ) -> StrataResult<Vec<SimilarityHit>> {
        let query = self.engine.embed_with_timeout(text, timeout)?;
        let indexed = self.store.index_providers(organization_id)?;
        if !indexed.is_empty() && !indexed.contains(&query.provider) {
            warn!(
                org = %organization_id,
                query_provider = %query.provider,
                "similarity index built by a different provider"
            );
            return Err(StrataError::ExternalServiceUnavailable {
                service: "similarity index".to_string(),
                reason: format!(
                    "index built with {}, query embedded by {}",
                    indexed.join(", "),
                    query.provider
                ),
            });
        }
        let hits =
            self.store
                .search_streams(organization_id, &query.provider, query.as_slice(), top_k)?;
        debug!(org = %organization_id, provider = %query.provider, hits = hits.len(), "similarity search");
        Ok(hits
            .into_iter()
            .map(|(stream_id, score)| SimilarityHit { stream_id, score })
            .collect())
    }
}
