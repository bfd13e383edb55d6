//! StorageEngine: owns the connection pool, runs migrations on open, and
//! implements every storage trait.

use std::path::Path;

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;
use strata_core::models::{
    AuditEntry, DerivedEntity, Permission, Placement, Relation, RoutingResult, Rule,
    RuleExecutionRecord, Stream, StreamStatus,
};
use strata_core::traits::{
    IGraphStorage, IPlacementStorage, IRoutingLog, IRuleStorage, IVectorIndexStorage,
};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{
    audit_ops, permission_ops, placement_ops, relation_ops, routing_log_ops, rule_ops, stream_ops,
    vector_search,
};

pub struct StorageEngine {
    pool: ConnectionPool,
    /// File-backed mode reads through the pool. In-memory mode routes reads
    /// through the writer because in-memory readers are separate databases.
    use_read_pool: bool,
}

impl StorageEngine {
    /// Open a file-backed engine with default settings.
    pub fn open(path: &Path) -> StrataResult<Self> {
        Self::open_with_config(path, &StorageConfig::default())
    }

    pub fn open_with_config(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let engine = Self {
            pool,
            use_read_pool: true,
        };
        engine.initialize()?;
        Ok(engine)
    }

    /// In-memory engine, used by tests and ephemeral tooling.
    pub fn open_in_memory() -> StrataResult<Self> {
        let pool = ConnectionPool::open_in_memory(&StorageConfig::default())?;
        let engine = Self {
            pool,
            use_read_pool: false,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> StrataResult<()> {
        let version = self
            .pool
            .writer
            .with_conn_sync(|conn| migrations::run_migrations(conn))?;
        tracing::debug!(schema_version = version, "storage initialized");
        Ok(())
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn schema_version(&self) -> StrataResult<u32> {
        self.with_reader(migrations::current_version)
    }

    fn with_reader<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> StrataResult<T>,
    {
        if self.use_read_pool {
            self.pool.readers.with_conn(f)
        } else {
            self.pool.writer.with_conn_sync(f)
        }
    }

    fn with_writer<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> StrataResult<T>,
    {
        self.pool.writer.with_conn_sync(f)
    }
}

impl IGraphStorage for StorageEngine {
    fn create_stream(&self, stream: &Stream) -> StrataResult<()> {
        self.with_writer(|conn| stream_ops::insert_stream(conn, stream))
    }

    fn get_stream(&self, id: &str) -> StrataResult<Option<Stream>> {
        self.with_reader(|conn| stream_ops::get_stream(conn, id))
    }

    fn list_streams(&self, organization_id: Option<&str>) -> StrataResult<Vec<Stream>> {
        self.with_reader(|conn| stream_ops::list_streams(conn, organization_id))
    }

    fn update_stream_config(&self, id: &str, config: &serde_json::Value) -> StrataResult<()> {
        self.with_writer(|conn| stream_ops::update_config(conn, id, config))
    }

    fn set_statuses(&self, changes: &[(String, StreamStatus)]) -> StrataResult<()> {
        self.with_writer(|conn| stream_ops::set_statuses(conn, changes))
    }

    fn delete_stream(&self, id: &str) -> StrataResult<Vec<Relation>> {
        self.with_writer(|conn| stream_ops::delete_stream(conn, id))
    }

    fn create_child_stream(&self, stream: &Stream, edge: &Relation) -> StrataResult<()> {
        self.with_writer(|conn| relation_ops::create_child(conn, stream, edge))
    }

    fn add_relation(&self, relation: &Relation) -> StrataResult<()> {
        self.with_writer(|conn| relation_ops::add_relation(conn, relation))
    }

    fn get_relation(&self, id: &str) -> StrataResult<Option<Relation>> {
        self.with_reader(|conn| relation_ops::get_relation(conn, id))
    }

    fn active_relations(&self) -> StrataResult<Vec<Relation>> {
        self.with_reader(relation_ops::active_relations)
    }

    fn parents_of(&self, child_id: &str) -> StrataResult<Vec<Relation>> {
        self.with_reader(|conn| relation_ops::parents_of(conn, child_id))
    }

    fn children_of(&self, parent_id: &str) -> StrataResult<Vec<Relation>> {
        self.with_reader(|conn| relation_ops::children_of(conn, parent_id))
    }

    fn deactivate_relation(&self, id: &str) -> StrataResult<()> {
        self.with_writer(|conn| relation_ops::deactivate_relation(conn, id))
    }

    fn move_stream(&self, child_id: &str, new_edge: Option<&Relation>) -> StrataResult<Vec<String>> {
        self.with_writer(|conn| relation_ops::move_stream(conn, child_id, new_edge))
    }

    fn set_permission(&self, relation_id: &str, permission: &Permission) -> StrataResult<()> {
        self.with_writer(|conn| permission_ops::upsert_permission(conn, relation_id, permission))
    }

    fn permissions_for(&self, relation_id: &str) -> StrataResult<Vec<Permission>> {
        self.with_reader(|conn| permission_ops::permissions_for(conn, relation_id))
    }

    fn append_audit(&self, entry: &AuditEntry) -> StrataResult<()> {
        self.with_writer(|conn| audit_ops::insert_audit_entry(conn, entry))
    }

    fn audit_log(&self, stream_id: &str) -> StrataResult<Vec<AuditEntry>> {
        self.with_reader(|conn| audit_ops::query_by_stream(conn, stream_id))
    }
}

impl IRuleStorage for StorageEngine {
    fn save_rule(&self, rule: &Rule) -> StrataResult<()> {
        self.with_writer(|conn| rule_ops::save_rule(conn, rule))
    }

    fn get_rule(&self, id: &str) -> StrataResult<Option<Rule>> {
        self.with_reader(|conn| rule_ops::get_rule(conn, id))
    }

    fn list_rules(&self, organization_id: &str) -> StrataResult<Vec<Rule>> {
        self.with_reader(|conn| rule_ops::list_rules(conn, organization_id))
    }

    fn delete_rule(&self, id: &str) -> StrataResult<()> {
        self.with_writer(|conn| rule_ops::delete_rule(conn, id))
    }

    fn record_execution(&self, record: &RuleExecutionRecord) -> StrataResult<()> {
        self.with_writer(|conn| rule_ops::record_execution(conn, record))
    }

    fn executions_for(&self, rule_id: &str) -> StrataResult<Vec<RuleExecutionRecord>> {
        self.with_reader(|conn| rule_ops::executions_for(conn, rule_id))
    }
}

impl IPlacementStorage for StorageEngine {
    fn get_placement(&self, entity_id: &str) -> StrataResult<Option<Placement>> {
        self.with_reader(|conn| placement_ops::get_placement(conn, entity_id))
    }

    fn upsert_placement(&self, placement: &Placement) -> StrataResult<()> {
        self.with_writer(|conn| placement_ops::upsert_placement(conn, placement))
    }

    fn create_derived(&self, derived: &DerivedEntity) -> StrataResult<()> {
        self.with_writer(|conn| placement_ops::insert_derived(conn, derived))
    }

    fn derived_from(&self, source_entity_id: &str) -> StrataResult<Vec<DerivedEntity>> {
        self.with_reader(|conn| placement_ops::derived_from(conn, source_entity_id))
    }
}

impl IVectorIndexStorage for StorageEngine {
    fn upsert_stream_embedding(
        &self,
        stream_id: &str,
        organization_id: &str,
        provider: &str,
        content_hash: &str,
        embedding: &[f32],
    ) -> StrataResult<()> {
        self.with_writer(|conn| {
            vector_search::upsert_embedding(
                conn,
                stream_id,
                organization_id,
                provider,
                content_hash,
                embedding,
            )
        })
    }

    fn stream_embedding_hash(&self, stream_id: &str) -> StrataResult<Option<String>> {
        self.with_reader(|conn| vector_search::embedding_hash(conn, stream_id))
    }

    fn remove_stream_embedding(&self, stream_id: &str) -> StrataResult<()> {
        self.with_writer(|conn| vector_search::remove_embedding(conn, stream_id))
    }

    fn index_providers(&self, organization_id: &str) -> StrataResult<Vec<String>> {
        self.with_reader(|conn| vector_search::index_providers(conn, organization_id))
    }

    fn search_streams(
        &self,
        organization_id: &str,
        provider: &str,
        query: &[f32],
        limit: usize,
    ) -> StrataResult<Vec<(String, f64)>> {
        self.with_reader(|conn| {
            vector_search::search_streams(conn, organization_id, provider, query, limit)
        })
    }
}

impl IRoutingLog for StorageEngine {
    fn append_routing(&self, organization_id: &str, result: &RoutingResult) -> StrataResult<()> {
        self.with_writer(|conn| routing_log_ops::append(conn, organization_id, result))
    }

    fn routing_history(&self, entity_id: &str) -> StrataResult<Vec<RoutingResult>> {
        self.with_reader(|conn| routing_log_ops::history(conn, entity_id))
    }
}
