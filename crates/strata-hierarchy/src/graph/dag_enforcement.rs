//! Cycle checks on the arena before any edge insertion.

use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::Dfs;

use super::arena::IndexedGraph;

/// Whether inserting `parent → child` would create a cycle: the child is the
/// parent itself, or the parent is already a descendant of the child.
pub fn would_create_cycle(graph: &IndexedGraph, parent: NodeIndex, child: NodeIndex) -> bool {
    if parent == child {
        return true;
    }
    has_path(graph, child, parent)
}

/// DFS reachability over active edges.
pub fn has_path(graph: &IndexedGraph, from: NodeIndex, to: NodeIndex) -> bool {
    let mut dfs = Dfs::new(&graph.graph, from);
    while let Some(node) = dfs.next(&graph.graph) {
        if node == to {
            return true;
        }
    }
    false
}

/// Strongly connected components with more than one node, plus self-loops.
pub fn find_cycles(graph: &IndexedGraph) -> Vec<Vec<NodeIndex>> {
    tarjan_scc(&graph.graph)
        .into_iter()
        .filter(|scc| {
            scc.len() > 1 || scc.iter().any(|n| graph.graph.find_edge(*n, *n).is_some())
        })
        .collect()
}
