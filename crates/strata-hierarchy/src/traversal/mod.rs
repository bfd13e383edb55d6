//! Bounded, cycle-safe traversals over the arena.

pub mod ancestors;
pub mod common_ancestor;
pub mod descendants;
pub mod path;
pub mod siblings;

use serde::{Deserialize, Serialize};

/// A stream reached by a traversal, with its hop distance from the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraversalNode {
    pub stream_id: String,
    pub name: String,
    pub depth: usize,
}

/// Root-to-node chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamPath {
    pub stream_ids: Vec<String>,
    pub names: Vec<String>,
    /// Names joined with `" / "`.
    pub breadcrumb: String,
}
