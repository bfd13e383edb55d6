//! Condition evaluation. Every condition yields a [`ConditionResult`]; a
//! rule is satisfied only when all of its conditions match.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use strata_core::models::{Condition, ConditionOperator, Rule};

use crate::accessor::{get_field, type_name, FieldError};

const PATTERN_CACHE_CAPACITY: u64 = 512;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionResult {
    pub field: String,
    pub operator: ConditionOperator,
    pub expected: Value,
    /// The field's value, when it could be read.
    pub actual: Option<Value>,
    pub matched: bool,
    pub diagnostic: Option<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEvaluation {
    pub satisfied: bool,
    /// matched / total; 1.0 for a rule without conditions.
    pub confidence: f64,
    pub conditions: Vec<ConditionResult>,
}

/// Evaluates conditions, caching compiled regex patterns.
pub struct ConditionEvaluator {
    patterns: Cache<String, Arc<Regex>>,
}

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self {
            patterns: Cache::new(PATTERN_CACHE_CAPACITY),
        }
    }

    pub fn evaluate_rule(&self, rule: &Rule, fields: &Value) -> RuleEvaluation {
        let conditions: Vec<ConditionResult> = rule
            .conditions
            .iter()
            .map(|c| self.evaluate(c, fields))
            .collect();
        let matched = conditions.iter().filter(|c| c.matched).count();
        let confidence = if conditions.is_empty() {
            1.0
        } else {
            matched as f64 / conditions.len() as f64
        };
        RuleEvaluation {
            satisfied: matched == conditions.len(),
            confidence,
            conditions,
        }
    }

    pub fn evaluate(&self, condition: &Condition, fields: &Value) -> ConditionResult {
        let (actual, outcome) = match get_field(fields, &condition.field) {
            Ok(actual) => (Some(actual.clone()), self.compare(condition, actual)),
            Err(e) => (None, Err(e)),
        };
        let (matched, diagnostic) = match outcome {
            Ok(m) => (m, None),
            Err(e) => (false, Some(e)),
        };
        ConditionResult {
            field: condition.field.clone(),
            operator: condition.operator,
            expected: condition.value.clone(),
            actual,
            matched,
            diagnostic,
        }
    }

    fn compare(&self, condition: &Condition, actual: &Value) -> Result<bool, FieldError> {
        let path = condition.field.as_str();
        let expected = &condition.value;
        match condition.operator {
            ConditionOperator::Equals => Ok(values_equal(actual, expected)),
            ConditionOperator::Contains => match actual {
                Value::String(s) => {
                    let needle = expect_str(path, expected)?;
                    Ok(s.to_lowercase().contains(&needle.to_lowercase()))
                }
                Value::Array(items) => Ok(items.iter().any(|item| loosely_equal(item, expected))),
                other => Err(wrong_type(path, "string or array", other)),
            },
            ConditionOperator::Regex => {
                let Value::String(s) = actual else {
                    return Err(wrong_type(path, "string", actual));
                };
                let pattern = self.pattern(expected)?;
                Ok(pattern.is_match(s))
            }
            ConditionOperator::Gt => order(path, actual, expected).map(|o| o.is_gt()),
            ConditionOperator::Lt => order(path, actual, expected).map(|o| o.is_lt()),
            ConditionOperator::In => Ok(expect_array(path, expected)?
                .iter()
                .any(|candidate| values_equal(actual, candidate))),
            ConditionOperator::NotIn => Ok(!expect_array(path, expected)?
                .iter()
                .any(|candidate| values_equal(actual, candidate))),
        }
    }

    fn pattern(&self, expected: &Value) -> Result<Arc<Regex>, FieldError> {
        let Value::String(source) = expected else {
            return Err(FieldError::InvalidPattern {
                pattern: expected.to_string(),
                reason: "pattern must be a string".to_string(),
            });
        };
        if let Some(compiled) = self.patterns.get(source) {
            return Ok(compiled);
        }
        let compiled = Arc::new(Regex::new(source).map_err(|e| FieldError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?);
        self.patterns.insert(source.clone(), compiled.clone());
        Ok(compiled)
    }
}

impl Default for ConditionEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn wrong_type(path: &str, expected: &str, actual: &Value) -> FieldError {
    FieldError::FieldWrongType {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: type_name(actual).to_string(),
    }
}

fn expect_str<'v>(path: &str, value: &'v Value) -> Result<&'v str, FieldError> {
    value.as_str().ok_or_else(|| wrong_type(path, "string operand", value))
}

fn expect_array<'v>(path: &str, value: &'v Value) -> Result<&'v Vec<Value>, FieldError> {
    value
        .as_array()
        .ok_or_else(|| wrong_type(path, "array operand", value))
}

/// Numbers compare numerically (`1 == 1.0`); everything else structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}

/// Like [`values_equal`], but strings compare case-insensitively.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.eq_ignore_ascii_case(y),
        _ => values_equal(a, b),
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Numbers order numerically; RFC 3339 timestamps order chronologically.
fn order(path: &str, actual: &Value, expected: &Value) -> Result<std::cmp::Ordering, FieldError> {
    if let (Some(a), Some(b)) = (actual.as_f64(), expected.as_f64()) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| wrong_type(path, "comparable number", actual));
    }
    if let (Some(a), Some(b)) = (parse_timestamp(actual), parse_timestamp(expected)) {
        return Ok(a.cmp(&b));
    }
    if actual.is_number() || parse_timestamp(actual).is_some() {
        Err(wrong_type(path, "operand of the same kind", expected))
    } else {
        Err(wrong_type(path, "number or timestamp", actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eval(field: &str, op: ConditionOperator, value: Value, doc: &Value) -> ConditionResult {
        ConditionEvaluator::new().evaluate(&Condition::new(field, op, value), doc)
    }

    fn task() -> Value {
        json!({
            "resourceType": "TASK",
            "title": "Call supplier about Invoice",
            "estimatedHours": 0.1,
            "priority": "HIGH",
            "tags": ["Finance", "q3"],
            "dueDate": "2026-03-01T12:00:00Z"
        })
    }

    #[test]
    fn contains_is_case_insensitive() {
        let doc = task();
        assert!(eval("title", ConditionOperator::Contains, json!("invoice"), &doc).matched);
        assert!(eval("tags", ConditionOperator::Contains, json!("finance"), &doc).matched);
        assert!(!eval("tags", ConditionOperator::Contains, json!("q4"), &doc).matched);
    }

    #[test]
    fn equals_compares_numbers_numerically() {
        let doc = json!({"n": 2});
        assert!(eval("n", ConditionOperator::Equals, json!(2.0), &doc).matched);
        assert!(!eval("priority", ConditionOperator::Equals, json!("high"), &task()).matched);
    }

    #[test]
    fn gt_lt_cover_numbers_and_timestamps() {
        let doc = task();
        assert!(eval("estimatedHours", ConditionOperator::Lt, json!(0.5), &doc).matched);
        assert!(!eval("estimatedHours", ConditionOperator::Gt, json!(0.5), &doc).matched);
        assert!(eval("dueDate", ConditionOperator::Gt, json!("2026-01-01T00:00:00Z"), &doc).matched);
    }

    #[test]
    fn in_and_not_in() {
        let doc = task();
        assert!(eval("priority", ConditionOperator::In, json!(["HIGH", "URGENT"]), &doc).matched);
        assert!(eval("priority", ConditionOperator::NotIn, json!(["LOW"]), &doc).matched);
        assert!(!eval("priority", ConditionOperator::NotIn, json!(["HIGH"]), &doc).matched);
    }

    #[test]
    fn regex_matches_and_reports_bad_patterns() {
        let doc = task();
        assert!(eval("title", ConditionOperator::Regex, json!("^Call\\b"), &doc).matched);
        let bad = eval("title", ConditionOperator::Regex, json!("(unclosed"), &doc);
        assert!(!bad.matched);
        assert!(matches!(bad.diagnostic, Some(FieldError::InvalidPattern { .. })));
    }

    #[test]
    fn diagnostics_separate_missing_from_wrong_type() {
        let doc = task();
        let missing = eval("budget", ConditionOperator::Gt, json!(10), &doc);
        assert!(matches!(missing.diagnostic, Some(FieldError::FieldNotFound { .. })));
        assert!(missing.actual.is_none());

        let wrong = eval("title", ConditionOperator::Gt, json!(10), &doc);
        assert!(matches!(wrong.diagnostic, Some(FieldError::FieldWrongType { .. })));
        assert_eq!(wrong.actual, Some(json!("Call supplier about Invoice")));

        let not_in_missing = eval("budget", ConditionOperator::NotIn, json!([1]), &doc);
        assert!(!not_in_missing.matched);
    }

    #[test]
    fn confidence_is_fraction_matched() {
        let mut rule = Rule::new("org", "r");
        let evaluator = ConditionEvaluator::new();
        assert_eq!(evaluator.evaluate_rule(&rule, &task()).confidence, 1.0);

        rule.conditions = vec![
            Condition::new("title", ConditionOperator::Contains, json!("call")),
            Condition::new("priority", ConditionOperator::Equals, json!("LOW")),
            Condition::new("tags", ConditionOperator::Contains, json!("q3")),
            Condition::new("missing", ConditionOperator::Equals, json!(1)),
        ];
        let evaluation = evaluator.evaluate_rule(&rule, &task());
        assert!(!evaluation.satisfied);
        assert_eq!(evaluation.confidence, 0.5);
    }
}
