//! RuleEngine: ordered rule passes over one entity, action dispatch, and
//! the per-execution log.

use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;
use serde_json::Value;

use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{
    ActionOutcome, ActionType, Context, Entity, ExecutionState, Priority, Rule, RuleAction,
    RuleExecutionRecord,
};
use strata_core::traits::{ActionExecutor, IRuleStorage};
use strata_observability::events;

use crate::conditions::{ConditionEvaluator, RuleEvaluation};
use crate::report::{DryRunReport, RuleExecution, RuleRunReport};
use crate::validation::validate_rule;

pub struct RuleEngine {
    rules: Arc<dyn IRuleStorage>,
    executor: Arc<dyn ActionExecutor>,
    evaluator: ConditionEvaluator,
}

impl RuleEngine {
    pub fn new(rules: Arc<dyn IRuleStorage>, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            rules,
            executor,
            evaluator: ConditionEvaluator::new(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn IRuleStorage> {
        &self.rules
    }

    /// Validate and store a rule document.
    pub fn save_rule(&self, rule: &Rule) -> StrataResult<()> {
        validate_rule(rule)?;
        self.rules.save_rule(rule)
    }

    /// Enabled rules of the organization covering `entity`, highest priority
    /// first, ties by id.
    pub fn candidate_rules(&self, organization_id: &str, entity: &Entity) -> StrataResult<Vec<Rule>> {
        let mut rules: Vec<Rule> = self
            .rules
            .list_rules(organization_id)?
            .into_iter()
            .filter(|r| r.enabled && r.applies_to(entity.resource_type()))
            .collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        Ok(rules)
    }

    /// Conditions only. No actions run and nothing is recorded.
    pub fn evaluate(&self, rule: &Rule, entity: &Entity) -> RuleEvaluation {
        self.evaluator.evaluate_rule(rule, &entity.field_map())
    }

    /// Run every candidate rule against `entity` in order. Stops after a
    /// satisfied, fully successful rule with `stop_on_first_match`.
    pub fn execute(&self, organization_id: &str, entity: &Entity) -> StrataResult<RuleRunReport> {
        let fields = entity.field_map();
        let mut report = RuleRunReport {
            entity_id: entity.id().to_string(),
            executions: Vec::new(),
            stopped_by: None,
        };
        for rule in self.candidate_rules(organization_id, entity)? {
            let execution = self.run(&rule, entity, &fields)?;
            let stop = rule.stop_on_first_match && execution.succeeded();
            report.executions.push(execution);
            if stop {
                report.stopped_by = Some(rule.id.clone());
                break;
            }
        }
        Ok(report)
    }

    /// Run one rule by id, enabled or not.
    pub fn run_rule(&self, rule_id: &str, entity: &Entity) -> StrataResult<RuleExecution> {
        let rule = self
            .rules
            .get_rule(rule_id)?
            .ok_or_else(|| StrataError::not_found("rule", rule_id))?;
        if !rule.applies_to(entity.resource_type()) {
            let mut execution = self.skeleton(&rule, entity);
            execution.transitions.push(ExecutionState::Skipped);
            execution.state = ExecutionState::Skipped;
            return Ok(execution);
        }
        self.run(&rule, entity, &entity.field_map())
    }

    /// Dry run: per-condition breakdown and the actions that would run.
    pub fn test_rule(&self, rule: &Rule, entity: &Entity) -> DryRunReport {
        let evaluation = self.evaluate(rule, entity);
        let applies = rule.applies_to(entity.resource_type());
        let actions_to_run = if applies && evaluation.satisfied {
            rule.actions.clone()
        } else {
            Vec::new()
        };
        DryRunReport {
            rule_id: rule.id.clone(),
            applies,
            satisfied: evaluation.satisfied,
            confidence: evaluation.confidence,
            conditions: evaluation.conditions,
            actions_to_run,
        }
    }

    /// Entities run in parallel; each entity's pass stays sequential.
    pub fn execute_batch(
        &self,
        organization_id: &str,
        entities: &[Entity],
    ) -> Vec<StrataResult<RuleRunReport>> {
        entities
            .par_iter()
            .map(|entity| self.execute(organization_id, entity))
            .collect()
    }

    fn skeleton(&self, rule: &Rule, entity: &Entity) -> RuleExecution {
        RuleExecution {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            entity_id: entity.id().to_string(),
            state: ExecutionState::Pending,
            transitions: vec![ExecutionState::Pending],
            confidence: 0.0,
            conditions: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    fn run(&self, rule: &Rule, entity: &Entity, fields: &Value) -> StrataResult<RuleExecution> {
        let mut execution = self.skeleton(rule, entity);

        let evaluation = self.evaluator.evaluate_rule(rule, fields);
        execution.confidence = evaluation.confidence;
        execution.conditions = evaluation.conditions;
        execution.transitions.push(ExecutionState::ConditionsEvaluated);

        if !evaluation.satisfied {
            execution.transitions.push(ExecutionState::Skipped);
            execution.state = ExecutionState::Skipped;
            tracing::debug!(rule_id = %rule.id, entity_id = %entity.id(), confidence = execution.confidence, "rule skipped");
            return Ok(execution);
        }

        execution.transitions.push(ExecutionState::ActionsRunning);
        execution.outcomes = rule
            .actions
            .iter()
            .enumerate()
            .map(|(i, action)| self.dispatch(i, action, entity))
            .collect();

        let succeeded = execution.outcomes.iter().filter(|o| o.success).count();
        execution.state = if succeeded == execution.outcomes.len() {
            ExecutionState::Success
        } else if succeeded == 0 {
            ExecutionState::Failure
        } else {
            ExecutionState::PartialFailure
        };
        execution.transitions.push(execution.state);

        self.rules.record_execution(&RuleExecutionRecord {
            rule_id: rule.id.clone(),
            entity_id: entity.id().to_string(),
            state: execution.state,
            confidence: execution.confidence,
            success: execution.succeeded(),
            outcomes: execution.outcomes.clone(),
            executed_at: Utc::now(),
        })?;
        events::rule_fired(&rule.id, entity.id(), execution.state.as_str(), execution.succeeded());
        Ok(execution)
    }

    fn dispatch(&self, index: usize, action: &RuleAction, entity: &Entity) -> ActionOutcome {
        let result = self.apply(index, action, entity);
        match result {
            Ok(output) => ActionOutcome {
                action_type: action.action_type,
                success: true,
                output,
                error: None,
            },
            Err(e) => {
                tracing::warn!(
                    action = action.action_type.as_str(),
                    entity_id = %entity.id(),
                    error = %e,
                    "rule action failed"
                );
                ActionOutcome {
                    action_type: action.action_type,
                    success: false,
                    output: Value::Null,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn apply(&self, index: usize, action: &RuleAction, entity: &Entity) -> StrataResult<Value> {
        let config = &action.config;
        match action.action_type {
            ActionType::MoveToStream => self.executor.move_to_stream(entity, config_str(config, index, "streamId")?),
            ActionType::AssignContext => {
                let raw = config_str(config, index, "context")?;
                let context = Context::from_str_name(raw).ok_or_else(|| {
                    StrataError::invalid(format!("actions[{index}].config.context"), format!("unknown context {raw}"))
                })?;
                self.executor.assign_context(entity, context)
            }
            ActionType::SetPriority => {
                let raw = config_str(config, index, "priority")?;
                let priority = Priority::from_str_name(raw).ok_or_else(|| {
                    StrataError::invalid(format!("actions[{index}].config.priority"), format!("unknown priority {raw}"))
                })?;
                self.executor.set_priority(entity, priority)
            }
            ActionType::CreateTask => self.executor.create_task(entity, config),
            ActionType::CreateProject => self.executor.create_project(entity, config),
            ActionType::SendNotification => self.executor.send_notification(entity, config),
        }
    }
}

fn config_str<'c>(config: &'c Value, index: usize, key: &str) -> StrataResult<&'c str> {
    config
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| StrataError::invalid(format!("actions[{index}].config.{key}"), "required string"))
}
