//! Cache of `(organization, role) → stream id` lookups, invalidated per
//! organization on every hierarchy mutation.

use std::time::Duration;

use moka::sync::Cache;

use strata_core::config::HierarchyConfig;
use strata_core::models::StreamRole;

type RoleKey = (String, StreamRole);

pub struct RoleCache {
    cache: Cache<RoleKey, Option<String>>,
}

impl RoleCache {
    pub fn new(config: &HierarchyConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.role_cache_size)
            .time_to_live(Duration::from_secs(config.role_cache_ttl_secs))
            .support_invalidation_closures()
            .build();
        Self { cache }
    }

    /// `Some(hit)` when cached; the hit itself may be a cached miss (`None`).
    pub fn get(&self, organization_id: &str, role: StreamRole) -> Option<Option<String>> {
        self.cache.get(&(organization_id.to_string(), role))
    }

    pub fn insert(&self, organization_id: &str, role: StreamRole, stream_id: Option<String>) {
        self.cache
            .insert((organization_id.to_string(), role), stream_id);
    }

    /// Drop every cached entry of one organization.
    pub fn invalidate_organization(&self, organization_id: &str) {
        let org = organization_id.to_string();
        if let Err(e) = self.cache.invalidate_entries_if(move |key, _| key.0 == org) {
            tracing::warn!(error = %e, "role cache predicate rejected; clearing cache");
            self.cache.invalidate_all();
        }
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_is_scoped_to_organization() {
        let cache = RoleCache::new(&HierarchyConfig::default());
        cache.insert("org-a", StreamRole::Inbox, Some("a-inbox".into()));
        cache.insert("org-b", StreamRole::Inbox, Some("b-inbox".into()));

        cache.invalidate_organization("org-a");

        assert_eq!(cache.get("org-a", StreamRole::Inbox), None);
        assert_eq!(
            cache.get("org-b", StreamRole::Inbox),
            Some(Some("b-inbox".to_string()))
        );
    }

    #[test]
    fn cached_miss_is_distinguishable_from_absent_entry() {
        let cache = RoleCache::new(&HierarchyConfig::default());
        cache.insert("org", StreamRole::Reference, None);
        assert_eq!(cache.get("org", StreamRole::Reference), Some(None));
        assert_eq!(cache.get("org", StreamRole::Inbox), None);
    }
}
