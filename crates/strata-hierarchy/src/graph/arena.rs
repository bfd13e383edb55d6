//! petgraph `StableGraph` holding streams as nodes and active relations as
//! edges, plus an id → `NodeIndex` map for O(1) lookup.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use strata_core::models::{InheritanceRule, Relation, RelationType, Stream};

/// Weight on a parent → child edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeWeight {
    pub relation_id: String,
    pub relation_type: RelationType,
    pub inheritance: InheritanceRule,
    pub created_at: DateTime<Utc>,
}

impl From<&Relation> for EdgeWeight {
    fn from(relation: &Relation) -> Self {
        Self {
            relation_id: relation.id.clone(),
            relation_type: relation.relation_type,
            inheritance: relation.inheritance,
            created_at: relation.created_at,
        }
    }
}

pub type StreamGraph = StableGraph<Stream, EdgeWeight, Directed>;

pub struct IndexedGraph {
    pub graph: StreamGraph,
    pub node_index: HashMap<String, NodeIndex>,
}

impl IndexedGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Insert a stream, replacing the node weight if it already exists.
    pub fn upsert_stream(&mut self, stream: Stream) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&stream.id) {
            if let Some(weight) = self.graph.node_weight_mut(idx) {
                *weight = stream;
            }
            return idx;
        }
        let id = stream.id.clone();
        let idx = self.graph.add_node(stream);
        self.node_index.insert(id, idx);
        idx
    }

    pub fn get_node(&self, stream_id: &str) -> Option<NodeIndex> {
        self.node_index.get(stream_id).copied()
    }

    pub fn stream(&self, stream_id: &str) -> Option<&Stream> {
        self.get_node(stream_id)
            .and_then(|idx| self.graph.node_weight(idx))
    }

    pub fn stream_at(&self, idx: NodeIndex) -> Option<&Stream> {
        self.graph.node_weight(idx)
    }

    pub fn stream_mut(&mut self, stream_id: &str) -> Option<&mut Stream> {
        let idx = self.get_node(stream_id)?;
        self.graph.node_weight_mut(idx)
    }

    /// Remove a stream and every edge touching it.
    pub fn remove_stream(&mut self, stream_id: &str) -> bool {
        match self.node_index.remove(stream_id) {
            Some(idx) => {
                self.graph.remove_node(idx);
                true
            }
            None => false,
        }
    }

    pub fn add_edge(&mut self, parent: NodeIndex, child: NodeIndex, weight: EdgeWeight) -> EdgeIndex {
        self.graph.add_edge(parent, child, weight)
    }

    pub fn remove_relation(&mut self, relation_id: &str) -> bool {
        let found = self
            .graph
            .edge_indices()
            .find(|e| {
                self.graph
                    .edge_weight(*e)
                    .is_some_and(|w| w.relation_id == relation_id)
            });
        match found {
            Some(e) => self.graph.remove_edge(e).is_some(),
            None => false,
        }
    }

    /// Remove every incoming edge of `child`.
    pub fn clear_parents(&mut self, child: NodeIndex) {
        let incoming: Vec<EdgeIndex> = self
            .graph
            .edges_directed(child, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        for e in incoming {
            self.graph.remove_edge(e);
        }
    }

    /// Parent links ordered oldest edge first, then by parent id.
    pub fn parent_links(&self, child: NodeIndex) -> Vec<(NodeIndex, &EdgeWeight)> {
        self.sorted_links(child, Direction::Incoming)
    }

    /// Child links ordered oldest edge first, then by child id.
    pub fn child_links(&self, parent: NodeIndex) -> Vec<(NodeIndex, &EdgeWeight)> {
        self.sorted_links(parent, Direction::Outgoing)
    }

    fn sorted_links(&self, idx: NodeIndex, dir: Direction) -> Vec<(NodeIndex, &EdgeWeight)> {
        let mut links: Vec<(NodeIndex, &EdgeWeight)> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = match dir {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                };
                (other, e.weight())
            })
            .collect();
        links.sort_by(|a, b| {
            a.1.created_at
                .cmp(&b.1.created_at)
                .then_with(|| self.id_of(a.0).cmp(self.id_of(b.0)))
        });
        links
    }

    pub fn id_of(&self, idx: NodeIndex) -> &str {
        self.graph
            .node_weight(idx)
            .map(|s| s.id.as_str())
            .unwrap_or_default()
    }

    /// The deterministic primary parent: oldest edge, then smallest parent id.
    pub fn primary_parent(&self, child: NodeIndex) -> Option<NodeIndex> {
        self.parent_links(child).first().map(|(p, _)| *p)
    }

    /// Edges between an ordered pair.
    pub fn edges_between(&self, parent: NodeIndex, child: NodeIndex) -> Vec<&EdgeWeight> {
        self.graph
            .edges_directed(parent, Direction::Outgoing)
            .filter(|e| e.target() == child)
            .map(|e| e.weight())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index.clear();
    }
}

impl Default for IndexedGraph {
    fn default() -> Self {
        Self::new()
    }
}
