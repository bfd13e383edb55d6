//! HierarchyEngine: owns the arena, mirrors every mutation to storage, and
//! serves traversals under a read lock.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;

use strata_core::config::HierarchyConfig;
use strata_core::constants::MAX_TRAVERSAL_DEPTH;
use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{
    AuditEntry, AuditOperation, InheritanceRule, NewStream, Permission, Relation, RelationType,
    Stream, StreamRole, StreamStatus,
};
use strata_core::traits::IGraphStorage;
use strata_observability::events;

use crate::freeze;
use crate::graph::{dag_enforcement, sync, EdgeWeight, IndexedGraph};
use crate::integrity::{self, IntegrityReport, IntegrityScope};
use crate::role_cache::RoleCache;
use crate::role_policy;
use crate::traversal::{
    ancestors, common_ancestor, descendants, path, siblings, StreamPath, TraversalNode,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub streams: usize,
    pub relations: usize,
    pub roots: usize,
}

pub struct HierarchyEngine {
    graph: Arc<RwLock<IndexedGraph>>,
    storage: Arc<dyn IGraphStorage>,
    role_cache: RoleCache,
    config: HierarchyConfig,
}

impl HierarchyEngine {
    /// Build an engine over `storage` and hydrate the arena from it.
    pub fn new(storage: Arc<dyn IGraphStorage>, config: HierarchyConfig) -> StrataResult<Self> {
        let engine = Self {
            graph: Arc::new(RwLock::new(IndexedGraph::new())),
            storage,
            role_cache: RoleCache::new(&config),
            config,
        };
        engine.hydrate()?;
        Ok(engine)
    }

    /// Reload the arena from storage and drop every cached role lookup.
    pub fn hydrate(&self) -> StrataResult<()> {
        let mut guard = self.write()?;
        sync::rebuild_from_storage(self.storage.as_ref(), &mut guard)?;
        self.role_cache.invalidate_all();
        Ok(())
    }

    pub fn storage(&self) -> &Arc<dyn IGraphStorage> {
        &self.storage
    }

    pub fn config(&self) -> &HierarchyConfig {
        &self.config
    }

    fn read(&self) -> StrataResult<RwLockReadGuard<'_, IndexedGraph>> {
        self.graph
            .read()
            .map_err(|e| StrataError::ConcurrencyError(e.to_string()))
    }

    fn write(&self) -> StrataResult<RwLockWriteGuard<'_, IndexedGraph>> {
        self.graph
            .write()
            .map_err(|e| StrataError::ConcurrencyError(e.to_string()))
    }

    fn effective_depth(&self, max_depth: Option<usize>) -> usize {
        max_depth
            .unwrap_or(self.config.max_traversal_depth)
            .min(MAX_TRAVERSAL_DEPTH)
    }

    fn audit(&self, stream_id: &str, operation: AuditOperation, actor: &str, details: serde_json::Value) {
        let entry = AuditEntry {
            stream_id: stream_id.to_string(),
            operation,
            actor: actor.to_string(),
            details,
            timestamp: Utc::now(),
        };
        if let Err(e) = self.storage.append_audit(&entry) {
            tracing::warn!(stream_id = %stream_id, operation = operation.as_str(), error = %e, "audit append failed");
        }
    }

    fn require<'g>(graph: &'g IndexedGraph, stream_id: &str) -> StrataResult<&'g Stream> {
        graph
            .stream(stream_id)
            .ok_or_else(|| StrataError::not_found("stream", stream_id))
    }

    fn check_placement(parent: &Stream, child: &Stream) -> StrataResult<()> {
        let mut violations = role_policy::check_child(parent, child);
        if let Some(v) = role_policy::check_status(parent, child) {
            violations.push(v);
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(StrataError::ValidationError { violations })
        }
    }

    // --- Mutations ---

    /// Create a stream, optionally under `parent_id` with a default edge.
    /// A stream created under a FROZEN parent starts FROZEN.
    pub fn create_stream(
        &self,
        new_stream: NewStream,
        parent_id: Option<&str>,
        actor: &str,
    ) -> StrataResult<Stream> {
        let mut stream = new_stream.into_stream();
        if let Some(v) = role_policy::check_own(&stream) {
            return Err(StrataError::ValidationError { violations: vec![v] });
        }

        let mut graph = self.write()?;
        let parent = match parent_id {
            Some(pid) => {
                let parent = Self::require(&graph, pid)?;
                if parent.status == StreamStatus::Frozen {
                    stream.status = StreamStatus::Frozen;
                }
                Self::check_placement(parent, &stream)?;
                if parent.organization_id != stream.organization_id {
                    return Err(StrataError::invalid(
                        "organizationId",
                        "parent belongs to a different organization",
                    ));
                }
                Some(pid.to_string())
            }
            None => None,
        };

        let relation = match &parent {
            Some(pid) => {
                let relation = Relation::new(pid, &stream.id, actor);
                self.storage.create_child_stream(&stream, &relation)?;
                Some(relation)
            }
            None => {
                self.storage.create_stream(&stream)?;
                None
            }
        };

        let child_idx = graph.upsert_stream(stream.clone());
        if let Some(relation) = &relation {
            if let Some(parent_idx) = graph.get_node(&relation.parent_id) {
                graph.add_edge(parent_idx, child_idx, EdgeWeight::from(relation));
            }
        }
        drop(graph);

        self.role_cache.invalidate_organization(&stream.organization_id);
        self.audit(
            &stream.id,
            AuditOperation::Create,
            actor,
            serde_json::json!({ "parentId": parent }),
        );
        events::stream_created(&stream.id, &stream.organization_id, stream.role.map(|r| r.as_str()));
        Ok(stream)
    }

    /// Add an active edge `parent → child`.
    pub fn attach(
        &self,
        parent_id: &str,
        child_id: &str,
        relation_type: RelationType,
        inheritance: InheritanceRule,
        actor: &str,
    ) -> StrataResult<Relation> {
        let mut graph = self.write()?;
        let parent = Self::require(&graph, parent_id)?;
        let child = Self::require(&graph, child_id)?;
        Self::check_placement(parent, child)?;
        let organization_id = child.organization_id.clone();

        let (Some(p_idx), Some(c_idx)) = (graph.get_node(parent_id), graph.get_node(child_id)) else {
            return Err(StrataError::not_found("stream", child_id));
        };
        if dag_enforcement::would_create_cycle(&graph, p_idx, c_idx) {
            events::cycle_rejected(parent_id, child_id);
            return Err(StrataError::CycleDetected {
                path: format!("{parent_id} -> {child_id} -> ... -> {parent_id}"),
            });
        }

        let relation = Relation::new(parent_id, child_id, actor)
            .with_type(relation_type)
            .with_inheritance(inheritance);
        self.storage.add_relation(&relation)?;
        graph.add_edge(p_idx, c_idx, EdgeWeight::from(&relation));
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        self.audit(
            child_id,
            AuditOperation::Attach,
            actor,
            serde_json::json!({ "parentId": parent_id, "relationId": relation.id }),
        );
        Ok(relation)
    }

    /// Deactivate every active edge `parent → child`. Returns how many were removed.
    pub fn detach(&self, parent_id: &str, child_id: &str, actor: &str) -> StrataResult<usize> {
        let mut graph = self.write()?;
        let organization_id = Self::require(&graph, child_id)?.organization_id.clone();
        Self::require(&graph, parent_id)?;
        let (Some(p_idx), Some(c_idx)) = (graph.get_node(parent_id), graph.get_node(child_id)) else {
            return Ok(0);
        };
        let relation_ids: Vec<String> = graph
            .edges_between(p_idx, c_idx)
            .into_iter()
            .map(|w| w.relation_id.clone())
            .collect();
        if relation_ids.is_empty() {
            return Err(StrataError::not_found(
                "relation",
                format!("{parent_id} -> {child_id}"),
            ));
        }
        for id in &relation_ids {
            self.storage.deactivate_relation(id)?;
            graph.remove_relation(id);
        }
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        self.audit(
            child_id,
            AuditOperation::Detach,
            actor,
            serde_json::json!({ "parentId": parent_id, "relationIds": relation_ids }),
        );
        Ok(relation_ids.len())
    }

    /// Re-parent `stream_id` under `new_parent_id`, or make it a root with `None`.
    ///
    /// The cycle check and the storage transaction run under the arena write
    /// lock; storage re-checks inside its transaction. On any error nothing changes.
    pub fn move_node(
        &self,
        stream_id: &str,
        new_parent_id: Option<&str>,
        actor: &str,
    ) -> StrataResult<Option<Relation>> {
        let mut graph = self.write()?;
        let stream = Self::require(&graph, stream_id)?;
        let organization_id = stream.organization_id.clone();
        let Some(s_idx) = graph.get_node(stream_id) else {
            return Err(StrataError::not_found("stream", stream_id));
        };

        let old_parents: Vec<String> = graph
            .parent_links(s_idx)
            .iter()
            .map(|(p, _)| graph.id_of(*p).to_string())
            .collect();
        let template = graph.parent_links(s_idx).first().map(|(_, w)| (*w).clone());

        let new_edge = match new_parent_id {
            Some(pid) => {
                let parent = Self::require(&graph, pid)?;
                Self::check_placement(parent, stream)?;
                let Some(p_idx) = graph.get_node(pid) else {
                    return Err(StrataError::not_found("stream", pid));
                };
                if dag_enforcement::would_create_cycle(&graph, p_idx, s_idx) {
                    events::cycle_rejected(pid, stream_id);
                    return Err(StrataError::CycleDetected {
                        path: format!("{pid} -> {stream_id} -> ... -> {pid}"),
                    });
                }
                let mut relation = Relation::new(pid, stream_id, actor);
                if let Some(t) = &template {
                    relation = relation
                        .with_type(t.relation_type)
                        .with_inheritance(t.inheritance);
                }
                Some((p_idx, relation))
            }
            None => None,
        };

        self.storage
            .move_stream(stream_id, new_edge.as_ref().map(|(_, r)| r))?;

        graph.clear_parents(s_idx);
        if let Some((p_idx, relation)) = &new_edge {
            graph.add_edge(*p_idx, s_idx, EdgeWeight::from(relation));
        }
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        self.audit(
            stream_id,
            AuditOperation::Move,
            actor,
            serde_json::json!({ "from": old_parents, "to": new_parent_id }),
        );
        events::stream_moved(stream_id, old_parents.len(), new_parent_id, actor);
        Ok(new_edge.map(|(_, r)| r))
    }

    /// Freeze a stream and all its active descendants. Returns the ids that changed.
    pub fn freeze_subtree(&self, stream_id: &str, actor: &str) -> StrataResult<Vec<String>> {
        let mut graph = self.write()?;
        let organization_id = Self::require(&graph, stream_id)?.organization_id.clone();
        let plan = freeze::plan_freeze(&graph, stream_id);
        self.apply_statuses(&mut graph, &plan)?;
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        let changed: Vec<String> = plan.into_iter().map(|(id, _)| id).collect();
        if !changed.is_empty() {
            self.audit(
                stream_id,
                AuditOperation::Freeze,
                actor,
                serde_json::json!({ "changed": changed }),
            );
        }
        events::subtree_frozen(stream_id, changed.len());
        Ok(changed)
    }

    /// Reactivate a stream and every frozen ancestor. Returns the ids that changed.
    pub fn unfreeze_subtree(&self, stream_id: &str, actor: &str) -> StrataResult<Vec<String>> {
        let mut graph = self.write()?;
        let organization_id = Self::require(&graph, stream_id)?.organization_id.clone();
        let plan = freeze::plan_unfreeze(&graph, stream_id);
        self.apply_statuses(&mut graph, &plan)?;
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        let changed: Vec<String> = plan.into_iter().map(|(id, _)| id).collect();
        if !changed.is_empty() {
            self.audit(
                stream_id,
                AuditOperation::Unfreeze,
                actor,
                serde_json::json!({ "changed": changed }),
            );
        }
        events::subtree_unfrozen(stream_id, changed.len());
        Ok(changed)
    }

    pub fn archive_stream(&self, stream_id: &str, actor: &str) -> StrataResult<()> {
        let mut graph = self.write()?;
        let organization_id = Self::require(&graph, stream_id)?.organization_id.clone();
        let plan = vec![(stream_id.to_string(), StreamStatus::Archived)];
        self.apply_statuses(&mut graph, &plan)?;
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        self.audit(stream_id, AuditOperation::Archive, actor, serde_json::json!({}));
        Ok(())
    }

    fn apply_statuses(
        &self,
        graph: &mut IndexedGraph,
        plan: &[(String, StreamStatus)],
    ) -> StrataResult<()> {
        if plan.is_empty() {
            return Ok(());
        }
        self.storage.set_statuses(plan)?;
        let now = Utc::now();
        for (id, status) in plan {
            if let Some(stream) = graph.stream_mut(id) {
                stream.status = *status;
                stream.updated_at = now;
            }
        }
        Ok(())
    }

    /// Hard delete. Rejected with `HasChildren` while active children exist.
    /// The removed edge rows, inactive ones included, go into the audit entry.
    pub fn delete_stream(&self, stream_id: &str, actor: &str) -> StrataResult<()> {
        let mut graph = self.write()?;
        let organization_id = Self::require(&graph, stream_id)?.organization_id.clone();
        if let Some(idx) = graph.get_node(stream_id) {
            let children = graph.child_links(idx).len();
            if children > 0 {
                return Err(StrataError::HasChildren {
                    id: stream_id.to_string(),
                    children,
                });
            }
        }
        let purged = self.storage.delete_stream(stream_id)?;
        graph.remove_stream(stream_id);
        drop(graph);

        self.role_cache.invalidate_organization(&organization_id);
        self.audit(
            stream_id,
            AuditOperation::Delete,
            actor,
            serde_json::json!({ "relations": purged }),
        );
        Ok(())
    }

    /// Replace a stream's explicit configuration document.
    pub fn replace_config(
        &self,
        stream_id: &str,
        config: serde_json::Value,
        actor: &str,
    ) -> StrataResult<()> {
        self.update_config(stream_id, actor, |_| Ok((Some(config), ())))
    }

    /// Read-modify-write of a stream's explicit configuration.
    ///
    /// `update` gets the inheritance chain, the stream first, and returns the
    /// document to store (`None` stores nothing) plus a value handed back to
    /// the caller. It runs under the graph write lock, so concurrent updates
    /// of the same stream see each other's writes.
    pub fn update_config<T>(
        &self,
        stream_id: &str,
        actor: &str,
        update: impl FnOnce(&[Stream]) -> StrataResult<(Option<serde_json::Value>, T)>,
    ) -> StrataResult<T> {
        let mut graph = self.write()?;
        let chain = Self::chain_of(&graph, stream_id)?;
        let (config, out) = update(&chain)?;
        let Some(config) = config else {
            return Ok(out);
        };
        self.storage.update_stream_config(stream_id, &config)?;
        if let Some(stream) = graph.stream_mut(stream_id) {
            stream.config = config;
            stream.updated_at = Utc::now();
        }
        drop(graph);
        self.audit(stream_id, AuditOperation::ConfigUpdate, actor, serde_json::json!({}));
        Ok(out)
    }

    pub fn set_permission(&self, relation_id: &str, permission: &Permission) -> StrataResult<()> {
        self.storage.set_permission(relation_id, permission)
    }

    /// Open by default: no matching permission means granted.
    pub fn is_permitted(&self, relation_id: &str, data_scope: &str, action: &str) -> StrataResult<bool> {
        Ok(self
            .storage
            .permissions_for(relation_id)?
            .iter()
            .find(|p| p.data_scope == data_scope && p.action == action)
            .map_or(true, |p| p.granted))
    }

    // --- Queries ---

    pub fn get_stream(&self, stream_id: &str) -> StrataResult<Stream> {
        let graph = self.read()?;
        Self::require(&graph, stream_id).cloned()
    }

    pub fn streams_in(&self, organization_id: &str) -> StrataResult<Vec<Stream>> {
        let graph = self.read()?;
        let mut streams: Vec<Stream> = graph
            .graph
            .node_indices()
            .filter_map(|idx| graph.stream_at(idx))
            .filter(|s| s.organization_id == organization_id)
            .cloned()
            .collect();
        streams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(streams)
    }

    /// Ancestors nearest first; `max_depth` defaults to the configured depth
    /// and is capped at [`MAX_TRAVERSAL_DEPTH`].
    pub fn get_ancestors(&self, stream_id: &str, max_depth: Option<usize>) -> StrataResult<Vec<TraversalNode>> {
        let graph = self.read()?;
        Self::require(&graph, stream_id)?;
        Ok(ancestors::collect(&graph, stream_id, self.effective_depth(max_depth)))
    }

    pub fn get_descendants(&self, stream_id: &str, max_depth: Option<usize>) -> StrataResult<Vec<TraversalNode>> {
        let graph = self.read()?;
        Self::require(&graph, stream_id)?;
        Ok(descendants::collect(&graph, stream_id, self.effective_depth(max_depth)))
    }

    pub fn get_path(&self, stream_id: &str) -> StrataResult<StreamPath> {
        let graph = self.read()?;
        path::build(&graph, stream_id).ok_or_else(|| StrataError::not_found("stream", stream_id))
    }

    pub fn get_siblings(&self, stream_id: &str) -> StrataResult<Vec<Stream>> {
        let graph = self.read()?;
        Self::require(&graph, stream_id)?;
        Ok(siblings::collect(&graph, stream_id).into_iter().cloned().collect())
    }

    pub fn find_common_ancestor(&self, a: &str, b: &str) -> StrataResult<Option<Stream>> {
        let graph = self.read()?;
        Self::require(&graph, a)?;
        Self::require(&graph, b)?;
        Ok(common_ancestor::find(&graph, a, b).and_then(|id| graph.stream(&id).cloned()))
    }

    pub fn primary_parent(&self, stream_id: &str) -> StrataResult<Option<Stream>> {
        let graph = self.read()?;
        Self::require(&graph, stream_id)?;
        let parent = graph
            .get_node(stream_id)
            .and_then(|idx| graph.primary_parent(idx))
            .and_then(|p| graph.stream_at(p).cloned());
        Ok(parent)
    }

    /// Oldest parent reached through an edge that carries configuration down.
    pub fn inheritance_parent(&self, stream_id: &str) -> StrataResult<Option<Stream>> {
        let graph = self.read()?;
        Self::require(&graph, stream_id)?;
        let parent = graph.get_node(stream_id).and_then(|idx| {
            graph
                .parent_links(idx)
                .into_iter()
                .find(|(_, w)| w.inheritance.carries_down())
                .and_then(|(p, _)| graph.stream_at(p).cloned())
        });
        Ok(parent)
    }

    /// The stream followed by each successive inheritance parent, ending at
    /// the first stream with no inheriting parent. Bounded by
    /// [`MAX_TRAVERSAL_DEPTH`] and stops early if a stream repeats.
    pub fn inheritance_chain(&self, stream_id: &str) -> StrataResult<Vec<Stream>> {
        let graph = self.read()?;
        Self::chain_of(&graph, stream_id)
    }

    fn chain_of(graph: &IndexedGraph, stream_id: &str) -> StrataResult<Vec<Stream>> {
        let mut chain = vec![Self::require(graph, stream_id)?.clone()];
        let mut seen = HashSet::from([stream_id.to_string()]);
        let mut current = graph.get_node(stream_id);
        while let Some(idx) = current {
            if chain.len() > MAX_TRAVERSAL_DEPTH {
                break;
            }
            current = graph
                .parent_links(idx)
                .into_iter()
                .find(|(_, w)| w.inheritance.carries_down())
                .map(|(p, _)| p);
            let Some(parent) = current.and_then(|p| graph.stream_at(p)) else {
                break;
            };
            if !seen.insert(parent.id.clone()) {
                tracing::warn!(stream_id = %stream_id, repeated = %parent.id, "inheritance chain revisits a stream");
                break;
            }
            chain.push(parent.clone());
        }
        Ok(chain)
    }

    /// Oldest stream of the organization with `role`, cached per organization.
    pub fn find_by_role(&self, organization_id: &str, role: StreamRole) -> StrataResult<Option<Stream>> {
        if let Some(cached) = self.role_cache.get(organization_id, role) {
            return match cached {
                Some(id) => {
                    let graph = self.read()?;
                    Ok(graph.stream(&id).cloned())
                }
                None => Ok(None),
            };
        }
        let found = self
            .streams_in(organization_id)?
            .into_iter()
            .find(|s| s.has_role(role));
        self.role_cache
            .insert(organization_id, role, found.as_ref().map(|s| s.id.clone()));
        Ok(found)
    }

    /// Oldest stream of the organization whose type tag matches, case-insensitively.
    pub fn find_by_type_tag(&self, organization_id: &str, type_tag: &str) -> StrataResult<Option<Stream>> {
        Ok(self
            .streams_in(organization_id)?
            .into_iter()
            .find(|s| s.type_tag.eq_ignore_ascii_case(type_tag)))
    }

    pub fn validate_hierarchy_integrity(&self, scope: &IntegrityScope) -> StrataResult<IntegrityReport> {
        let graph = self.read()?;
        Ok(integrity::validate(&graph, scope))
    }

    pub fn stats(&self) -> StrataResult<GraphStats> {
        let graph = self.read()?;
        let roots = graph
            .graph
            .node_indices()
            .filter(|idx| graph.parent_links(*idx).is_empty())
            .count();
        Ok(GraphStats {
            streams: graph.node_count(),
            relations: graph.edge_count(),
            roots,
        })
    }
}
