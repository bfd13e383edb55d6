//! Root-to-node path along primary parents.

use std::collections::HashSet;

use strata_core::constants::{BREADCRUMB_SEPARATOR, MAX_TRAVERSAL_DEPTH};

use crate::graph::IndexedGraph;

use super::StreamPath;

/// Follow primary parents up to a root (or the hard depth cap), then reverse.
/// `None` for an unknown stream.
pub fn build(graph: &IndexedGraph, stream_id: &str) -> Option<StreamPath> {
    let start = graph.get_node(stream_id)?;

    let mut chain = vec![start];
    let mut seen = HashSet::from([start]);
    let mut current = start;
    while chain.len() <= MAX_TRAVERSAL_DEPTH {
        match graph.primary_parent(current) {
            Some(parent) if seen.insert(parent) => {
                chain.push(parent);
                current = parent;
            }
            _ => break,
        }
    }
    chain.reverse();

    let streams: Vec<_> = chain.iter().filter_map(|idx| graph.stream_at(*idx)).collect();
    let names: Vec<String> = streams.iter().map(|s| s.name.clone()).collect();
    Some(StreamPath {
        stream_ids: streams.iter().map(|s| s.id.clone()).collect(),
        breadcrumb: names.join(BREADCRUMB_SEPARATOR),
        names,
    })
}
