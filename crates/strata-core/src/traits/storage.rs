use crate::errors::StrataResult;
use crate::models::{
    AuditEntry, DerivedEntity, Permission, Placement, Relation, RoutingResult, Rule,
    RuleExecutionRecord, Stream, StreamStatus,
};

/// Streams, relations, permissions and the hierarchy audit log.
pub trait IGraphStorage: Send + Sync {
    // --- Streams ---
    fn create_stream(&self, stream: &Stream) -> StrataResult<()>;
    fn get_stream(&self, id: &str) -> StrataResult<Option<Stream>>;
    /// All streams, or one organization's when `organization_id` is given.
    fn list_streams(&self, organization_id: Option<&str>) -> StrataResult<Vec<Stream>>;
    fn update_stream_config(&self, id: &str, config: &serde_json::Value) -> StrataResult<()>;
    /// Apply every status change in one transaction.
    fn set_statuses(&self, changes: &[(String, StreamStatus)]) -> StrataResult<()>;
    /// Hard delete. Fails with `HasChildren` while active child edges exist.
    /// Returns every edge row (active or not) removed with the stream.
    fn delete_stream(&self, id: &str) -> StrataResult<Vec<Relation>>;

    // --- Relations ---
    /// Insert an active edge. Rejects self-edges, duplicates and cycles.
    fn add_relation(&self, relation: &Relation) -> StrataResult<()>;
    /// Insert `stream` with its first parent edge atomically. Neither row is
    /// written if the edge is rejected.
    fn create_child_stream(&self, stream: &Stream, edge: &Relation) -> StrataResult<()>;
    fn get_relation(&self, id: &str) -> StrataResult<Option<Relation>>;
    fn active_relations(&self) -> StrataResult<Vec<Relation>>;
    fn parents_of(&self, child_id: &str) -> StrataResult<Vec<Relation>>;
    fn children_of(&self, parent_id: &str) -> StrataResult<Vec<Relation>>;
    fn deactivate_relation(&self, id: &str) -> StrataResult<()>;
    /// Deactivate every active parent edge of `child_id` and insert `new_edge`
    /// (if any) atomically. Returns the ids of the deactivated edges.
    fn move_stream(&self, child_id: &str, new_edge: Option<&Relation>) -> StrataResult<Vec<String>>;

    // --- Permissions ---
    fn set_permission(&self, relation_id: &str, permission: &Permission) -> StrataResult<()>;
    fn permissions_for(&self, relation_id: &str) -> StrataResult<Vec<Permission>>;

    // --- Audit ---
    fn append_audit(&self, entry: &AuditEntry) -> StrataResult<()>;
    fn audit_log(&self, stream_id: &str) -> StrataResult<Vec<AuditEntry>>;
}

/// Rule documents and their execution log.
pub trait IRuleStorage: Send + Sync {
    fn save_rule(&self, rule: &Rule) -> StrataResult<()>;
    fn get_rule(&self, id: &str) -> StrataResult<Option<Rule>>;
    fn list_rules(&self, organization_id: &str) -> StrataResult<Vec<Rule>>;
    fn delete_rule(&self, id: &str) -> StrataResult<()>;
    /// Append to the execution log and bump the rule's counters together.
    fn record_execution(&self, record: &RuleExecutionRecord) -> StrataResult<()>;
    fn executions_for(&self, rule_id: &str) -> StrataResult<Vec<RuleExecutionRecord>>;
}

/// Where entities were placed, and items derived from them.
pub trait IPlacementStorage: Send + Sync {
    fn get_placement(&self, entity_id: &str) -> StrataResult<Option<Placement>>;
    fn upsert_placement(&self, placement: &Placement) -> StrataResult<()>;
    fn create_derived(&self, derived: &DerivedEntity) -> StrataResult<()>;
    fn derived_from(&self, source_entity_id: &str) -> StrataResult<Vec<DerivedEntity>>;
}

/// Stream-description embeddings.
pub trait IVectorIndexStorage: Send + Sync {
    /// Store `embedding` with the name of the provider that produced it.
    fn upsert_stream_embedding(
        &self,
        stream_id: &str,
        organization_id: &str,
        provider: &str,
        content_hash: &str,
        embedding: &[f32],
    ) -> StrataResult<()>;
    /// Content hash of the stored embedding, used to skip re-embedding.
    fn stream_embedding_hash(&self, stream_id: &str) -> StrataResult<Option<String>>;
    fn remove_stream_embedding(&self, stream_id: &str) -> StrataResult<()>;
    /// Distinct providers behind the organization's stored embeddings.
    fn index_providers(&self, organization_id: &str) -> StrataResult<Vec<String>>;
    /// Cosine search within one organization over embeddings from
    /// `provider` only, best first.
    fn search_streams(
        &self,
        organization_id: &str,
        provider: &str,
        query: &[f32],
        limit: usize,
    ) -> StrataResult<Vec<(String, f64)>>;
}

/// Append-only record of routing decisions.
pub trait IRoutingLog: Send + Sync {
    fn append_routing(&self, organization_id: &str, result: &RoutingResult) -> StrataResult<()>;
    fn routing_history(&self, entity_id: &str) -> StrataResult<Vec<RoutingResult>>;
}
