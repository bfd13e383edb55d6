//! Status plans for freeze/unfreeze. The engine persists a plan in one batch.

use std::collections::{HashSet, VecDeque};

use strata_core::models::StreamStatus;

use crate::graph::IndexedGraph;

/// ACTIVE → FROZEN for the stream and every descendant. FROZEN and
/// ARCHIVED streams are left alone, so re-freezing yields an empty plan.
pub fn plan_freeze(graph: &IndexedGraph, stream_id: &str) -> Vec<(String, StreamStatus)> {
    let Some(start) = graph.get_node(stream_id) else {
        return Vec::new();
    };
    let mut plan = Vec::new();
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if let Some(stream) = graph.stream_at(current) {
            if stream.status == StreamStatus::Active {
                plan.push((stream.id.clone(), StreamStatus::Frozen));
            }
        }
        for (child, _) in graph.child_links(current) {
            if visited.insert(child) {
                queue.push_back(child);
            }
        }
    }
    plan
}

/// The stream becomes ACTIVE, and so does every FROZEN ancestor, so that
/// the path above a reactivated stream is usable again. An ACTIVE stream
/// yields an empty plan.
pub fn plan_unfreeze(graph: &IndexedGraph, stream_id: &str) -> Vec<(String, StreamStatus)> {
    let Some(start) = graph.get_node(stream_id) else {
        return Vec::new();
    };
    let Some(stream) = graph.stream_at(start) else {
        return Vec::new();
    };
    if stream.status == StreamStatus::Active {
        return Vec::new();
    }
    let mut plan = vec![(stream.id.clone(), StreamStatus::Active)];
    let mut visited = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for (parent, _) in graph.parent_links(current) {
            if !visited.insert(parent) {
                continue;
            }
            if let Some(stream) = graph.stream_at(parent) {
                if stream.status == StreamStatus::Frozen {
                    plan.push((stream.id.clone(), StreamStatus::Active));
                }
            }
            queue.push_back(parent);
        }
    }
    plan
}
