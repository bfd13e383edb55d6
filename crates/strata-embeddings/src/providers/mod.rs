mod hashed_tfidf;

pub use hashed_tfidf::HashedTfIdf;

use strata_core::config::EmbeddingConfig;
use strata_core::traits::IEmbeddingProvider;
use tracing::warn;

/// Build the configured primary provider.
///
/// Only the hashed TF-IDF provider ships in-tree. Any other name is logged
/// and served by it, so a misconfigured deployment still embeds.
pub fn create_provider(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    match config.provider.as_str() {
        "tfidf" | HashedTfIdf::NAME => Box::new(HashedTfIdf::new(config.dimensions)),
        other => {
            warn!(provider = %other, "unknown embedding provider, using hashed tf-idf");
            Box::new(HashedTfIdf::new(config.dimensions))
        }
    }
}
