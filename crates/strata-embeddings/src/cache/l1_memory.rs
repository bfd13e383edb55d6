//! In-memory embedding cache keyed by blake3 hash of provider and text.

use std::time::Duration;

use moka::sync::Cache;

use crate::embedding::Embedding;

pub struct EmbeddingCache {
    inner: Cache<String, Embedding>,
}

impl EmbeddingCache {
    pub fn new(max_entries: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(60 * 60))
            .build();
        Self { inner }
    }

    pub fn get(&self, key: &str) -> Option<Embedding> {
        self.inner.get(key)
    }

    pub fn insert(&self, key: String, embedding: Embedding) {
        self.inner.insert(key, embedding);
    }

    /// Approximate; moka applies inserts and evictions lazily.
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{content_key, provider_key};

    #[test]
    fn hit_after_insert() {
        let cache = EmbeddingCache::new(16);
        let key = provider_key("tfidf", "call the supplier");
        cache.insert(key.clone(), Embedding::new(vec![0.5, 0.5], "tfidf"));
        let hit = cache.get(&key).unwrap();
        assert_eq!(hit.as_slice(), &[0.5, 0.5]);
        assert_eq!(hit.provider, "tfidf");
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn keys_are_content_addressed() {
        assert_eq!(content_key("same"), content_key("same"));
        assert_ne!(content_key("same"), content_key("Same"));
        assert_eq!(content_key("").len(), 64);
    }

    #[test]
    fn keys_separate_providers() {
        assert_eq!(provider_key("a", "text"), provider_key("a", "text"));
        assert_ne!(provider_key("a", "text"), provider_key("b", "text"));
        assert_ne!(provider_key("ab", "c"), provider_key("a", "bc"));
    }

    #[test]
    fn clear_drops_entries() {
        let cache = EmbeddingCache::new(16);
        cache.insert("k".to_string(), Embedding::new(vec![1.0], "tfidf"));
        cache.clear();
        assert!(cache.get("k").is_none());
    }
}
