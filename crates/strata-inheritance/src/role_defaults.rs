//! Built-in configuration for root streams, keyed by role.

use serde_json::{json, Value};
use strata_core::models::StreamRole;

/// Defaults a root stream with `role` starts from. Role-less and
/// unlisted roles start from an empty object.
pub fn role_default(role: Option<StreamRole>) -> Value {
    match role {
        Some(StreamRole::Inbox) => json!({ "autoRoute": true, "reviewFrequencyDays": 1 }),
        Some(StreamRole::NextActions) => json!({ "reviewFrequencyDays": 1 }),
        Some(StreamRole::WaitingFor) => json!({ "reviewFrequencyDays": 3 }),
        Some(StreamRole::SomedayMaybe) => json!({ "reviewFrequencyDays": 7 }),
        Some(StreamRole::Reference) => json!({ "retentionDays": 365 }),
        _ => json!({}),
    }
}
