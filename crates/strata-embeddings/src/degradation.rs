//! Ordered provider chain.
//!
//! Providers are tried in order; the first success wins. Falling past the
//! primary records a [`DegradationEvent`] and logs `embedding_fallback`.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strata_core::errors::{EmbeddingError, StrataError, StrataResult};
use strata_core::traits::IEmbeddingProvider;
use strata_observability::events;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradationEvent {
    pub primary: String,
    pub fallback_used: String,
    pub failure: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
pub struct DegradationChain {
    providers: Vec<Box<dyn IEmbeddingProvider>>,
    events: Mutex<Vec<DegradationEvent>>,
}

impl DegradationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.providers.push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Name of the first available provider, `"none"` for an exhausted chain.
    pub fn active_provider_name(&self) -> &str {
        self.providers
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    /// Embed `text`, returning the vector and the name of the provider that produced it.
    pub fn embed(&self, text: &str) -> StrataResult<(Vec<f32>, String)> {
        self.first_success(|p| p.embed(text))
    }

    pub fn embed_batch(&self, texts: &[String]) -> StrataResult<(Vec<Vec<f32>>, String)> {
        self.first_success(|p| p.embed_batch(texts))
    }

    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        match self.events.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    fn first_success<T>(
        &self,
        call: impl Fn(&dyn IEmbeddingProvider) -> StrataResult<T>,
    ) -> StrataResult<(T, String)> {
        let primary = self
            .providers
            .first()
            .map(|p| p.name().to_string())
            .unwrap_or_default();
        let mut failures: Vec<String> = Vec::new();

        for provider in &self.providers {
            if !provider.is_available() {
                failures.push(format!("{} unavailable", provider.name()));
                continue;
            }
            match call(provider.as_ref()) {
                Ok(out) => {
                    if !failures.is_empty() {
                        self.record(&primary, provider.name(), failures.join("; "));
                    }
                    return Ok((out, provider.name().to_string()));
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "embedding provider failed");
                    failures.push(format!("{}: {e}", provider.name()));
                }
            }
        }

        Err(StrataError::from(EmbeddingError::ProviderUnavailable {
            provider: if failures.is_empty() {
                "empty provider chain".to_string()
            } else {
                failures.join("; ")
            },
        }))
    }

    fn record(&self, primary: &str, fallback: &str, failure: String) {
        events::embedding_fallback(primary, fallback, &failure);
        let event = DegradationEvent {
            primary: primary.to_string(),
            fallback_used: fallback.to_string(),
            failure,
            timestamp: Utc::now(),
        };
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
