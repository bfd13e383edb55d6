#![allow(dead_code)]

use std::sync::Arc;

use strata_core::config::{EmbeddingConfig, HierarchyConfig, RoutingConfig};
use strata_core::models::{Entity, Rule, Task};
use strata_core::traits::{IEmbeddingProvider, IRuleStorage};
use strata_embeddings::{EmbeddingEngine, SimilarityIndex};
use strata_hierarchy::HierarchyEngine;
use strata_router::ContentRouter;
use strata_rules::{RuleEngine, StoreActionExecutor};
use strata_storage::StorageEngine;
use test_fixtures::{load_fixture, load_organization};

pub struct Harness {
    pub storage: Arc<StorageEngine>,
    pub hierarchy: Arc<HierarchyEngine>,
}

impl Harness {
    pub fn new(organization: &str) -> Self {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        load_organization(organization).seed(storage.as_ref()).unwrap();
        let hierarchy = Arc::new(HierarchyEngine::new(storage.clone(), HierarchyConfig::default()).unwrap());
        Self { storage, hierarchy }
    }

    pub fn seed_rules(&self) {
        let rules: Vec<Rule> = load_fixture("rules/acme_rules.json");
        for rule in &rules {
            self.storage.save_rule(rule).unwrap();
        }
    }

    pub fn rule_engine(&self) -> Arc<RuleEngine> {
        let executor = StoreActionExecutor::new(self.storage.clone(), self.storage.clone());
        Arc::new(RuleEngine::new(self.storage.clone(), Arc::new(executor)))
    }

    pub fn index(&self, primary: Option<Box<dyn IEmbeddingProvider>>) -> Arc<SimilarityIndex> {
        let config = EmbeddingConfig::default();
        let engine = match primary {
            Some(p) => EmbeddingEngine::with_primary(config, p),
            None => EmbeddingEngine::new(config),
        };
        Arc::new(SimilarityIndex::new(Arc::new(engine), self.storage.clone()))
    }

    /// Router with rules, no similarity index, and the routing log.
    pub fn router(&self, config: RoutingConfig) -> ContentRouter {
        ContentRouter::new(self.hierarchy.clone(), config)
            .with_rules(self.rule_engine())
            .with_log(self.storage.clone())
    }
}

pub fn task(id: &str, title: &str, hours: Option<f64>) -> Entity {
    Entity::Task(Task {
        id: id.into(),
        title: title.into(),
        description: None,
        estimated_hours: hours,
        priority: None,
        due_date: None,
    })
}
