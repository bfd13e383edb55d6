//! Downward traversal: "what does this contain?"

use std::collections::{HashSet, VecDeque};

use crate::graph::IndexedGraph;

use super::TraversalNode;

/// Descendants nearest first, excluding the origin. Mirror of
/// [`super::ancestors::collect`].
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
        for (child, _) in graph.child_links(current) {
            if !visited.insert(child) {
                continue;
            }
            if let Some(stream) = graph.stream_at(child) {
                nodes.push(TraversalNode {
                    stream_id: stream.id.clone(),
                    name: stream.name.clone(),
                    depth: depth + 1,
                });
            }
            queue.push_back((child, depth + 1));
        }
    }
    nodes
}
