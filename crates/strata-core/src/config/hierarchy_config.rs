use serde::{Deserialize, Serialize};

use super::defaults;

/// Hierarchy engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Default depth bound for ancestor/descendant traversal.
    pub max_traversal_depth: usize,
    /// Max entries in the role-node cache.
    pub role_cache_size: u64,
    /// Time-to-live of a cached role lookup.
    pub role_cache_ttl_secs: u64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            max_traversal_depth: defaults::DEFAULT_MAX_TRAVERSAL_DEPTH,
            role_cache_size: defaults::DEFAULT_ROLE_CACHE_SIZE,
            role_cache_ttl_secs: defaults::DEFAULT_ROLE_CACHE_TTL_SECS,
        }
    }
}
