//! Property tests: acyclicity under arbitrary moves, bounded traversal depth.

use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;

use strata_core::config::HierarchyConfig;
use strata_core::models::{NewStream, Relation, Stream};
use strata_core::traits::IGraphStorage;
use strata_core::StrataError;
use strata_hierarchy::graph::{dag_enforcement, EdgeWeight, IndexedGraph};
use strata_hierarchy::traversal::{ancestors, descendants};
use strata_hierarchy::HierarchyEngine;
use strata_storage::StorageEngine;

fn make_stream(i: usize) -> Stream {
    let mut stream = NewStream::new("org-prop", format!("Node {i}")).into_stream();
    stream.id = format!("n{i:02}");
    stream
}

/// Random DAG on `n` nodes: edges that would close a cycle are skipped.
fn build_random_dag(n: usize, edges: &[(usize, usize)]) -> IndexedGraph {
    let mut graph = IndexedGraph::new();
    let base = Utc::now();
    for i in 0..n {
        graph.upsert_stream(make_stream(i));
    }
    for (k, &(p, c)) in edges.iter().enumerate() {
        let (Some(p_idx), Some(c_idx)) = (
            graph.get_node(&format!("n{p:02}")),
            graph.get_node(&format!("n{c:02}")),
        ) else {
            continue;
        };
        if dag_enforcement::would_create_cycle(&graph, p_idx, c_idx)
            || !graph.edges_between(p_idx, c_idx).is_empty()
        {
            continue;
        }
        let mut relation = Relation::new(&format!("n{p:02}"), &format!("n{c:02}"), "prop");
        relation.created_at = base + Duration::milliseconds(k as i64);
        graph.add_edge(p_idx, c_idx, EdgeWeight::from(&relation));
    }
    graph
}

fn edge_strategy(n: usize) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..n, 0..n), 0..n * 3)
}

fn snapshot(storage: &StorageEngine) -> Vec<(String, String)> {
    let mut edges: Vec<(String, String)> = storage
        .active_relations()
        .unwrap()
        .into_iter()
        .map(|r| (r.parent_id, r.child_id))
        .collect();
    edges.sort();
    edges
}

proptest! {
    #[test]
    fn random_dag_has_no_cycles(edges in edge_strategy(20)) {
        let graph = build_random_dag(20, &edges);
        prop_assert!(dag_enforcement::find_cycles(&graph).is_empty());
    }

    #[test]
    fn traversal_depth_never_exceeds_limit(
        edges in edge_strategy(20),
        max_depth in 1usize..6,
    ) {
        let graph = build_random_dag(20, &edges);
        for i in 0..20 {
            let id = format!("n{i:02}");
            for node in ancestors::collect(&graph, &id, max_depth)
                .into_iter()
                .chain(descendants::collect(&graph, &id, max_depth))
            {
                prop_assert!(node.depth >= 1 && node.depth <= max_depth);
                prop_assert_ne!(&node.stream_id, &id);
            }
        }
    }

    #[test]
    fn traversal_lists_each_node_once(edges in edge_strategy(15)) {
        let graph = build_random_dag(15, &edges);
        for i in 0..15 {
            let found = descendants::collect(&graph, &format!("n{i:02}"), 50);
            let mut ids: Vec<&str> = found.iter().map(|n| n.stream_id.as_str()).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), before);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn moves_keep_the_hierarchy_acyclic(
        moves in prop::collection::vec((0usize..8, prop::option::of(0usize..8)), 1..20)
    ) {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let engine = HierarchyEngine::new(storage.clone(), HierarchyConfig::default()).unwrap();
        let ids: Vec<String> = (0..8)
            .map(|i| {
                engine
                    .create_stream(NewStream::new("org-prop", format!("S{i}")), None, "prop")
                    .unwrap()
                    .id
            })
            .collect();

        for (node, parent) in moves {
            let before = snapshot(&storage);
            let target = parent.map(|p| ids[p].as_str());
            match engine.move_node(&ids[node], target, "prop") {
                Ok(_) => {}
                Err(StrataError::CycleDetected { .. }) => {
                    prop_assert_eq!(snapshot(&storage), before);
                }
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
            let report = engine
                .validate_hierarchy_integrity(&strata_hierarchy::IntegrityScope::All)
                .unwrap();
            prop_assert!(report.is_clean());
            for id in &ids {
                let parents = storage.parents_of(id).unwrap();
                prop_assert!(parents.len() <= 1);
            }
        }
    }
}
