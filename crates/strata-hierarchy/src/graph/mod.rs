pub mod arena;
pub mod dag_enforcement;
pub mod sync;

pub use arena::{EdgeWeight, IndexedGraph};
