//! # strata-inheritance
//!
//! Effective configuration of a stream: its own explicit document deep-merged
//! over whatever it inherits. Nothing computed here is ever stored.

pub mod merge;
pub mod resolver;
pub mod role_defaults;
pub mod schema;

pub use merge::deep_merge;
pub use resolver::{ConfigInheritance, ConfigUpdate, SetConfigOptions};
pub use role_defaults::role_default;
pub use schema::{ConfigSchema, FieldSpec};
