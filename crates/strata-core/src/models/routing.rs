//! Routing decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::rule::ActionType;
use super::signals::{Context, EnergyLevel};

/// Pipeline stage that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStage {
    CustomRule,
    Heuristic,
    Similarity,
    Default,
}

impl RoutingStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomRule => "CUSTOM_RULE",
            Self::Heuristic => "HEURISTIC",
            Self::Similarity => "SIMILARITY",
            Self::Default => "DEFAULT",
        }
    }
}

impl fmt::Display for RoutingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A follow-up the caller may apply. The router never applies these itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub action_type: ActionType,
    pub config: serde_json::Value,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingResult {
    pub entity_id: String,
    pub target_stream_id: String,
    pub target_stream_name: String,
    /// Root-to-target breadcrumb.
    pub breadcrumb: String,
    /// Effective (inherited + own) configuration of the target.
    pub target_config: serde_json::Value,
    pub confidence: f64,
    pub stage: RoutingStage,
    pub reasoning: Vec<String>,
    pub fallback_used: bool,
    pub suggested_context: Option<Context>,
    pub suggested_energy: Option<EnergyLevel>,
    pub urgency: f64,
    pub suggested_actions: Vec<SuggestedAction>,
}
