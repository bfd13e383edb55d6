//! What a rule pass produced.

use serde::Serialize;

use strata_core::models::{ActionOutcome, ExecutionState, RuleAction};

use crate::conditions::ConditionResult;

/// One rule applied to one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleExecution {
    pub rule_id: String,
    pub rule_name: String,
    pub entity_id: String,
    pub state: ExecutionState,
    /// Every state the execution passed through, ending in `state`.
    pub transitions: Vec<ExecutionState>,
    pub confidence: f64,
    pub conditions: Vec<ConditionResult>,
    pub outcomes: Vec<ActionOutcome>,
}

impl RuleExecution {
    pub fn fired(&self) -> bool {
        !matches!(self.state, ExecutionState::Skipped | ExecutionState::Pending)
    }

    pub fn succeeded(&self) -> bool {
        self.state == ExecutionState::Success
    }
}

/// Every rule considered for one entity, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleRunReport {
    pub entity_id: String,
    pub executions: Vec<RuleExecution>,
    /// Rule whose `stop_on_first_match` ended the pass early.
    pub stopped_by: Option<String>,
}

impl RuleRunReport {
    pub fn fired(&self) -> impl Iterator<Item = &RuleExecution> {
        self.executions.iter().filter(|e| e.fired())
    }
}

/// Dry run of a single rule: nothing executes, nothing is recorded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunReport {
    pub rule_id: String,
    /// Whether the rule covers the entity's resource type.
    pub applies: bool,
    pub satisfied: bool,
    pub confidence: f64,
    pub conditions: Vec<ConditionResult>,
    pub actions_to_run: Vec<RuleAction>,
}
