//! # strata-core
//!
//! Foundation crate for the Strata workspace graph and content router.
//! Defines all models, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::StrataConfig;
pub use errors::{FieldViolation, StrataError, StrataResult};
pub use models::{
    Entity, Relation, ResourceType, RoutingResult, Rule, Stream, StreamRole, StreamStatus,
};
