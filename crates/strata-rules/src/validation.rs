//! Rule document validation. Violations carry paths like `conditions[0].value`.

use regex::Regex;
use serde_json::Value;

use strata_core::errors::{FieldViolation, StrataError, StrataResult};
use strata_core::models::{ActionType, Condition, ConditionOperator, Context, Priority, Rule};

pub fn validate_rule(rule: &Rule) -> StrataResult<()> {
    let violations = rule_violations(rule);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(StrataError::ValidationError { violations })
    }
}

pub fn rule_violations(rule: &Rule) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    if rule.name.trim().is_empty() {
        out.push(FieldViolation::new("name", "must not be empty"));
    }
    if rule.organization_id.trim().is_empty() {
        out.push(FieldViolation::new("organizationId", "must not be empty"));
    }
    for (i, condition) in rule.conditions.iter().enumerate() {
        check_condition(i, condition, &mut out);
    }
    for (i, action) in rule.actions.iter().enumerate() {
        let base = format!("actions[{i}].config");
        if !action.config.is_object() {
            out.push(FieldViolation::new(base, "must be an object"));
            continue;
        }
        for key in action.action_type.required_config_keys() {
            match action.config.get(*key) {
                Some(Value::String(s)) if !s.trim().is_empty() => {}
                _ => out.push(FieldViolation::new(
                    format!("{base}.{key}"),
                    "required non-empty string",
                )),
            }
        }
        let known = match action.action_type {
            ActionType::AssignContext => action
                .config
                .get("context")
                .and_then(Value::as_str)
                .map(|s| Context::from_str_name(s).is_some()),
            ActionType::SetPriority => action
                .config
                .get("priority")
                .and_then(Value::as_str)
                .map(|s| Priority::from_str_name(s).is_some()),
            _ => None,
        };
        if known == Some(false) {
            let key = action.action_type.required_config_keys()[0];
            out.push(FieldViolation::new(format!("{base}.{key}"), "unknown value"));
        }
    }
    out
}

fn check_condition(i: usize, condition: &Condition, out: &mut Vec<FieldViolation>) {
    if condition.field.trim().is_empty() {
        out.push(FieldViolation::new(format!("conditions[{i}].field"), "must not be empty"));
    }
    let path = format!("conditions[{i}].value");
    let value = &condition.value;
    match condition.operator {
        ConditionOperator::Regex => match value.as_str() {
            Some(pattern) => {
                if let Err(e) = Regex::new(pattern) {
                    out.push(FieldViolation::new(path, format!("invalid pattern: {e}")));
                }
            }
            None => out.push(FieldViolation::new(path, "pattern must be a string")),
        },
        ConditionOperator::Gt | ConditionOperator::Lt => {
            let timestamp = value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok());
            if !value.is_number() && !timestamp {
                out.push(FieldViolation::new(path, "must be a number or RFC 3339 timestamp"));
            }
        }
        ConditionOperator::In | ConditionOperator::NotIn => {
            if !value.is_array() {
                out.push(FieldViolation::new(path, "must be an array"));
            }
        }
        ConditionOperator::Contains => {
            if value.is_null() || value.is_object() || value.is_array() {
                out.push(FieldViolation::new(path, "must be a scalar"));
            }
        }
        ConditionOperator::Equals => {}
    }
}
