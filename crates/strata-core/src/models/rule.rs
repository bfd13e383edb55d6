//! Operator-authored rules: ordered conditions, ordered actions, priority and stop semantics.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::ResourceType;

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    /// Case-insensitive substring (strings) or membership (arrays).
    Contains,
    Regex,
    Gt,
    Lt,
    In,
    NotIn,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(field, operator, value)`. The field is a dot path into the entity's field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: serde_json::Value,
}

impl Condition {
    pub fn new(field: &str, operator: ConditionOperator, value: serde_json::Value) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    MoveToStream,
    AssignContext,
    SetPriority,
    CreateTask,
    CreateProject,
    SendNotification,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MoveToStream => "MOVE_TO_STREAM",
            Self::AssignContext => "ASSIGN_CONTEXT",
            Self::SetPriority => "SET_PRIORITY",
            Self::CreateTask => "CREATE_TASK",
            Self::CreateProject => "CREATE_PROJECT",
            Self::SendNotification => "SEND_NOTIFICATION",
        }
    }

    /// Config keys an action document must carry.
    pub fn required_config_keys(&self) -> &'static [&'static str] {
        match self {
            Self::MoveToStream => &["streamId"],
            Self::AssignContext => &["context"],
            Self::SetPriority => &["priority"],
            Self::CreateTask | Self::CreateProject => &["title"],
            Self::SendNotification => &["message"],
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(type, config)` action document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: ActionType,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl RuleAction {
    pub fn new(action_type: ActionType, config: serde_json::Value) -> Self {
        Self {
            action_type,
            config,
        }
    }

    /// Target stream of a MOVE_TO_STREAM action.
    pub fn target_stream(&self) -> Option<&str> {
        match self.action_type {
            ActionType::MoveToStream => self.config.get("streamId").and_then(|v| v.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resource types this rule applies to. Empty means all.
    #[serde(default)]
    pub resource_types: Vec<ResourceType>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub stop_on_first_match: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub execution_count: u64,
    #[serde(default)]
    pub last_executed: Option<DateTime<Utc>>,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    pub fn new(organization_id: &str, name: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: organization_id.to_string(),
            name: name.to_string(),
            description: None,
            resource_types: Vec::new(),
            conditions: Vec::new(),
            actions: Vec::new(),
            priority: 0,
            stop_on_first_match: false,
            enabled: true,
            execution_count: 0,
            last_executed: None,
        }
    }

    pub fn applies_to(&self, resource_type: ResourceType) -> bool {
        self.resource_types.is_empty() || self.resource_types.contains(&resource_type)
    }

    /// First MOVE_TO_STREAM target, used by the router's custom-rule stage.
    pub fn move_target(&self) -> Option<&str> {
        self.actions.iter().find_map(RuleAction::target_stream)
    }
}

/// Lifecycle of a single rule execution.
///
/// `Pending → ConditionsEvaluated → (Skipped | ActionsRunning) → (Success | PartialFailure | Failure)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Pending,
    ConditionsEvaluated,
    Skipped,
    ActionsRunning,
    Success,
    PartialFailure,
    Failure,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::ConditionsEvaluated => "CONDITIONS_EVALUATED",
            Self::Skipped => "SKIPPED",
            Self::ActionsRunning => "ACTIONS_RUNNING",
            Self::Success => "SUCCESS",
            Self::PartialFailure => "PARTIAL_FAILURE",
            Self::Failure => "FAILURE",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Skipped | Self::Success | Self::PartialFailure | Self::Failure
        )
    }
}

/// Outcome of one action within a rule execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action_type: ActionType,
    pub success: bool,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Persisted execution-log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleExecutionRecord {
    pub rule_id: String,
    pub entity_id: String,
    pub state: ExecutionState,
    pub confidence: f64,
    pub success: bool,
    pub outcomes: Vec<ActionOutcome>,
    pub executed_at: DateTime<Utc>,
}
