//! # strata-hierarchy
//!
//! The stream hierarchy: a petgraph arena mirrored from storage, with
//! cycle-safe mutations, bounded traversals, role-policy enforcement,
//! freeze/unfreeze, and integrity validation.

pub mod engine;
pub mod freeze;
pub mod graph;
pub mod integrity;
pub mod role_cache;
pub mod role_policy;
pub mod traversal;

pub use engine::{GraphStats, HierarchyEngine};
pub use integrity::{IntegrityReport, IntegrityScope, Violation};
pub use traversal::{StreamPath, TraversalNode};
