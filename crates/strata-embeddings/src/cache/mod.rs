mod l1_memory;

pub use l1_memory::EmbeddingCache;

/// Blake3 hex digest of `text`.
pub fn content_key(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Cache key for `text` as embedded by `provider`.
pub fn provider_key(provider: &str, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(provider.as_bytes());
    hasher.update(&[0]);
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}
