//! Read-only integrity validation. Defects are returned as data.

use std::collections::HashSet;

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use strata_core::constants::MAX_TRAVERSAL_DEPTH;
use strata_core::models::type_tags;

use crate::graph::{dag_enforcement, IndexedGraph};
use crate::role_policy;
use crate::traversal::descendants;

/// Which part of the graph to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityScope {
    All,
    Organization(String),
    /// A stream and everything below it.
    Subtree(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Streams forming a cycle over active edges.
    Cycle { stream_ids: Vec<String> },
    /// A leaf-tagged stream without an active parent.
    Orphan { stream_id: String, type_tag: String },
    /// A stream whose own role and type tag conflict.
    RoleTypeMismatch {
        stream_id: String,
        role: String,
        type_tag: String,
    },
    /// A parent/child pair that breaks the parent's role policy.
    ChildPolicy {
        parent_id: String,
        child_id: String,
        reason: String,
    },
    /// An ACTIVE stream directly under a FROZEN parent.
    ActiveUnderFrozen { parent_id: String, child_id: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub checked_streams: usize,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

fn scope_nodes(graph: &IndexedGraph, scope: &IntegrityScope) -> HashSet<NodeIndex> {
    match scope {
        IntegrityScope::All => graph.graph.node_indices().collect(),
        IntegrityScope::Organization(org) => graph
            .graph
            .node_indices()
            .filter(|idx| {
                graph
                    .stream_at(*idx)
                    .is_some_and(|s| &s.organization_id == org)
            })
            .collect(),
        IntegrityScope::Subtree(root) => {
            let Some(root_idx) = graph.get_node(root) else {
                return HashSet::new();
            };
            let mut nodes: HashSet<NodeIndex> = descendants::collect(graph, root, MAX_TRAVERSAL_DEPTH)
                .iter()
                .filter_map(|n| graph.get_node(&n.stream_id))
                .collect();
            nodes.insert(root_idx);
            nodes
        }
    }
}

/// Validate the scoped part of the graph. Never mutates.
pub fn validate(graph: &IndexedGraph, scope: &IntegrityScope) -> IntegrityReport {
    let nodes = scope_nodes(graph, scope);
    let mut violations = Vec::new();

    for cycle in dag_enforcement::find_cycles(graph) {
        if cycle.iter().any(|n| nodes.contains(n)) {
            let mut stream_ids: Vec<String> =
                cycle.iter().map(|n| graph.id_of(*n).to_string()).collect();
            stream_ids.sort();
            violations.push(Violation::Cycle { stream_ids });
        }
    }

    let mut ordered: Vec<NodeIndex> = nodes.iter().copied().collect();
    ordered.sort_by(|a, b| graph.id_of(*a).cmp(graph.id_of(*b)));

    for idx in &ordered {
        let Some(stream) = graph.stream_at(*idx) else {
            continue;
        };

        if let Some(v) = role_policy::check_own(stream) {
            violations.push(Violation::RoleTypeMismatch {
                stream_id: stream.id.clone(),
                role: stream.role.map(|r| r.as_str().to_string()).unwrap_or_default(),
                type_tag: stream.type_tag.clone(),
            });
            tracing::debug!(stream_id = %stream.id, reason = %v.reason, "role/type mismatch");
        }

        let parents = graph.parent_links(*idx);
        if type_tags::is_leaf(&stream.type_tag) && parents.is_empty() {
            violations.push(Violation::Orphan {
                stream_id: stream.id.clone(),
                type_tag: stream.type_tag.clone(),
            });
        }

        for (child_idx, _) in graph.child_links(*idx) {
            let Some(child) = graph.stream_at(child_idx) else {
                continue;
            };
            for v in role_policy::check_child(stream, child) {
                violations.push(Violation::ChildPolicy {
                    parent_id: stream.id.clone(),
                    child_id: child.id.clone(),
                    reason: v.reason,
                });
            }
            if role_policy::check_status(stream, child).is_some() {
                violations.push(Violation::ActiveUnderFrozen {
                    parent_id: stream.id.clone(),
                    child_id: child.id.clone(),
                });
            }
        }
    }

    IntegrityReport {
        checked_streams: ordered.len(),
        violations,
    }
}
