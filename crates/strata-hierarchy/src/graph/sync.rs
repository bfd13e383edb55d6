//! Rebuild the arena from storage.

use strata_core::errors::StrataResult;
use strata_core::traits::IGraphStorage;

use super::arena::{EdgeWeight, IndexedGraph};

/// Replace the arena's contents with every stream and active relation in
/// storage. Edges are loaded verbatim so that corrupted data surfaces in
/// integrity validation instead of being silently dropped.
pub fn rebuild_from_storage(storage: &dyn IGraphStorage, graph: &mut IndexedGraph) -> StrataResult<()> {
    graph.clear();
    for stream in storage.list_streams(None)? {
        graph.upsert_stream(stream);
    }
    let mut skipped = 0usize;
    for relation in storage.active_relations()? {
        match (graph.get_node(&relation.parent_id), graph.get_node(&relation.child_id)) {
            (Some(parent), Some(child)) => {
                graph.add_edge(parent, child, EdgeWeight::from(&relation));
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "relations reference missing streams");
    }
    tracing::debug!(
        streams = graph.node_count(),
        relations = graph.edge_count(),
        "hierarchy hydrated"
    );
    Ok(())
}
