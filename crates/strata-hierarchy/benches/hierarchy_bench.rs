use criterion::{criterion_group, criterion_main, Criterion};

use strata_core::models::{NewStream, Relation};
use strata_hierarchy::graph::{dag_enforcement, EdgeWeight, IndexedGraph};
use strata_hierarchy::traversal::{ancestors, descendants, path};

/// 200 streams, each linked to up to 5 later streams (forward only, ~1K edges).
fn build_1k_edge_dag() -> IndexedGraph {
    let mut graph = IndexedGraph::new();
    let n = 200;
    for i in 0..n {
        let mut stream = NewStream::new("org-bench", format!("Stream {i}")).into_stream();
        stream.id = format!("n{i}");
        graph.upsert_stream(stream);
    }
    let mut count = 0;
    for i in 0..n {
        for j in 1..=5 {
            let target = i + j;
            if target < n {
                let src = graph.get_node(&format!("n{i}")).unwrap();
                let tgt = graph.get_node(&format!("n{target}")).unwrap();
                if !dag_enforcement::would_create_cycle(&graph, src, tgt) {
                    let relation = Relation::new(&format!("n{i}"), &format!("n{target}"), "bench");
                    graph.add_edge(src, tgt, EdgeWeight::from(&relation));
                    count += 1;
                }
            }
        }
    }
    assert!(count >= 900, "Should have ~1K edges, got {count}");
    graph
}

fn bench_descendants(c: &mut Criterion) {
    let graph = build_1k_edge_dag();
    c.bench_function("descendants_depth_10_1k_edges", |b| {
        b.iter(|| descendants::collect(&graph, "n0", 10));
    });
}

fn bench_ancestors(c: &mut Criterion) {
    let graph = build_1k_edge_dag();
    c.bench_function("ancestors_depth_50_1k_edges", |b| {
        b.iter(|| ancestors::collect(&graph, "n199", 50));
    });
}

fn bench_path(c: &mut Criterion) {
    let graph = build_1k_edge_dag();
    c.bench_function("path_to_leaf_1k_edges", |b| {
        b.iter(|| path::build(&graph, "n199"));
    });
}

fn bench_dag_enforcement(c: &mut Criterion) {
    let graph = build_1k_edge_dag();
    let src = graph.get_node("n150").unwrap();
    let tgt = graph.get_node("n10").unwrap();
    c.bench_function("would_create_cycle_1k_edges", |b| {
        b.iter(|| dag_enforcement::would_create_cycle(&graph, src, tgt));
    });
}

criterion_group!(
    benches,
    bench_descendants,
    bench_ancestors,
    bench_path,
    bench_dag_enforcement
);
criterion_main!(benches);
