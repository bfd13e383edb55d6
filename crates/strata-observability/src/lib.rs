//! # strata-observability
//!
//! Tracing subscriber setup and the named structured events emitted by the
//! hierarchy, rule engine, and router.

pub mod tracing_setup;

pub use tracing_setup::{events, init_tracing, init_tracing_from_config};
