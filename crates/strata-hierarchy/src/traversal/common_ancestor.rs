//! Nearest common ancestor of two streams.

use std::collections::HashMap;

use strata_core::constants::MAX_TRAVERSAL_DEPTH;

use crate::graph::IndexedGraph;

use super::ancestors;

/// Each chain is the stream itself (depth 0) followed by its ancestors. The
/// result minimizes the combined distance from both streams; ties go to the
/// node nearer `a`, then to the smaller id.
pub fn find(graph: &IndexedGraph, a: &str, b: &str) -> Option<String> {
    let chain_a = chain(graph, a)?;
    let chain_b: HashMap<String, usize> = chain(graph, b)?.into_iter().collect();

    chain_a
        .into_iter()
        .filter_map(|(id, da)| chain_b.get(&id).map(|db| (da + db, da, id)))
        .min()
        .map(|(_, _, id)| id)
}

fn chain(graph: &IndexedGraph, stream_id: &str) -> Option<Vec<(String, usize)>> {
    graph.get_node(stream_id)?;
    let mut chain = vec![(stream_id.to_string(), 0)];
    chain.extend(
        ancestors::collect(graph, stream_id, MAX_TRAVERSAL_DEPTH)
            .into_iter()
            .map(|n| (n.stream_id, n.depth)),
    );
    Some(chain)
}
