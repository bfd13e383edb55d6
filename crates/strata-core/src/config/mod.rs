pub mod defaults;
mod embedding_config;
mod hierarchy_config;
mod observability_config;
mod routing_config;
mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use embedding_config::EmbeddingConfig;
pub use hierarchy_config::HierarchyConfig;
pub use observability_config::ObservabilityConfig;
pub use routing_config::{HeuristicConfidences, RoutingConfig};
pub use storage_config::StorageConfig;

use crate::errors::{StrataError, StrataResult};

/// Top-level configuration. Every section falls back to its defaults,
/// so an empty TOML document is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub storage: StorageConfig,
    pub hierarchy: HierarchyConfig,
    pub routing: RoutingConfig,
    pub embedding: EmbeddingConfig,
    pub observability: ObservabilityConfig,
}

impl StrataConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml(s: &str) -> StrataResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| StrataError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file on disk.
    pub fn from_file(path: &Path) -> StrataResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StrataError::ConfigError(format!("{}: {e}", path.display())))?;
        Self::from_toml(&raw)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> StrataResult<String> {
        toml::to_string(self).map_err(|e| StrataError::ConfigError(e.to_string()))
    }

    fn validate(&self) -> StrataResult<()> {
        let r = &self.routing;
        for (name, value) in [
            ("routing.confidence_threshold", r.confidence_threshold),
            ("routing.custom_rule_confidence", r.custom_rule_confidence),
            ("routing.default_confidence", r.default_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(StrataError::ConfigError(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.hierarchy.max_traversal_depth == 0 {
            return Err(StrataError::ConfigError(
                "hierarchy.max_traversal_depth must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("embedding.dimensions", self.embedding.dimensions),
            ("embedding.worker_threads", self.embedding.worker_threads),
            ("embedding.max_pending", self.embedding.max_pending),
        ] {
            if value == 0 {
                return Err(StrataError::ConfigError(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}
