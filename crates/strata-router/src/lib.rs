//! # strata-router
//!
//! Places tasks, messages, contacts, and deals into an organization's
//! stream hierarchy. Every decision carries its stage, confidence, and an
//! ordered reasoning trail. Suggested follow-up actions are returned, never
//! applied.

pub mod options;
pub mod policy;
pub mod router;
pub mod signals;
pub mod suggestions;

pub use options::RoutingOptions;
pub use policy::PolicyMatch;
pub use router::ContentRouter;
pub use signals::Signals;
