use std::collections::HashSet;

use strata_core::models::Stream;

use crate::graph::IndexedGraph;

/// Streams sharing any active parent with `stream_id`, excluding itself.
/// Ordered by parent, then by child link order.
pub fn collect<'g>(graph: &'g IndexedGraph, stream_id: &str) -> Vec<&'g Stream> {
    let Some(idx) = graph.get_node(stream_id) else {
        return Vec::new();
    };
    let mut seen = HashSet::from([idx]);
    let mut siblings = Vec::new();
    for (parent, _) in graph.parent_links(idx) {
        for (child, _) in graph.child_links(parent) {
            if seen.insert(child) {
                if let Some(stream) = graph.stream_at(child) {
                    siblings.push(stream);
                }
            }
        }
    }
    siblings
}
