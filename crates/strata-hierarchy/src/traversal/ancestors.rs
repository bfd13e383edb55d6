//! Upward traversal: "what contains this?"

use std::collections::{HashSet, VecDeque};

use crate::graph::IndexedGraph;

use super::TraversalNode;

/// Ancestors nearest first, excluding the origin.
///
/// Breadth-first with a visited set: every ancestor appears once at its
/// shallowest depth, and the walk terminates even if stored edges contain a
/// cycle. Within one depth, parents come in primary order (oldest edge first).
pub fn collect(graph: &IndexedGraph, stream_id: &str, max_depth: usize) -> Vec<TraversalNode> {
    let mut nodes = Vec::new();
    let start = match graph.get_node(stream_id) {
        Some(idx) => idx,
        None => return nodes,
    };

    let mut visited = HashSet::new();
    visited.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back((start, 0usize));

    while let Some((current, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for (parent, _) in graph.parent_links(current) {
            if !visited.insert(parent) {
                continue;
            }
            if let Some(stream) = graph.stream_at(parent) {
                nodes.push(TraversalNode {
                    stream_id: stream.id.clone(),
                    name: stream.name.clone(),
                    depth: depth + 1,
                });
            }
            queue.push_back((parent, depth + 1));
        }
    }
    nodes
}
