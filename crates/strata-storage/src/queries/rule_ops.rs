//! Rule documents and the rule execution log.

use rusqlite::{params, Connection, OptionalExtension, Row};

use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{ExecutionState, Rule, RuleExecutionRecord};

use super::{in_transaction, json_col, opt_ts_col, ts_col};
use crate::to_storage_err;

const RULE_COLUMNS: &str = "id, organization_id, name, description, resource_types, conditions, \
     actions, priority, stop_on_first_match, enabled, execution_count, last_executed";

fn rule_from_row(row: &Row<'_>) -> rusqlite::Result<Rule> {
    let count: i64 = row.get(10)?;
    Ok(Rule {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        resource_types: json_col(row, 4)?,
        conditions: json_col(row, 5)?,
        actions: json_col(row, 6)?,
        priority: row.get(7)?,
        stop_on_first_match: row.get(8)?,
        enabled: row.get(9)?,
        execution_count: count.max(0) as u64,
        last_executed: opt_ts_col(row, 11)?,
    })
}

/// Insert or replace a rule document. Counters are taken from the document.
pub fn save_rule(conn: &Connection, rule: &Rule) -> StrataResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO routing_rules ({RULE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                organization_id = excluded.organization_id,
                name = excluded.name,
                description = excluded.description,
                resource_types = excluded.resource_types,
                conditions = excluded.conditions,
                actions = excluded.actions,
                priority = excluded.priority,
                stop_on_first_match = excluded.stop_on_first_match,
                enabled = excluded.enabled,
                execution_count = excluded.execution_count,
                last_executed = excluded.last_executed"
        ),
        params![
            rule.id,
            rule.organization_id,
            rule.name,
            rule.description,
            serde_json::to_string(&rule.resource_types)?,
            serde_json::to_string(&rule.conditions)?,
            serde_json::to_string(&rule.actions)?,
            rule.priority,
            rule.stop_on_first_match,
            rule.enabled,
            rule.execution_count as i64,
            rule.last_executed.map(|d| d.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_rule(conn: &Connection, id: &str) -> StrataResult<Option<Rule>> {
    conn.query_row(
        &format!("SELECT {RULE_COLUMNS} FROM routing_rules WHERE id = ?1"),
        params![id],
        rule_from_row,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// All rules of an organization, priority descending, ties by id.
pub fn list_rules(conn: &Connection, organization_id: &str) -> StrataResult<Vec<Rule>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM routing_rules
             WHERE organization_id = ?1 ORDER BY priority DESC, id ASC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![organization_id], rule_from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn delete_rule(conn: &Connection, id: &str) -> StrataResult<()> {
    let deleted = conn
        .execute("DELETE FROM routing_rules WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    if deleted == 0 {
        return Err(StrataError::not_found("rule", id));
    }
    Ok(())
}

/// Bump the rule's counters and append the execution in one transaction.
pub fn record_execution(conn: &Connection, record: &RuleExecutionRecord) -> StrataResult<()> {
    in_transaction(conn, |conn| {
        let executed_at = record.executed_at.to_rfc3339();
        let changed = conn
            .execute(
                "UPDATE routing_rules
                 SET execution_count = execution_count + 1, last_executed = ?2
                 WHERE id = ?1",
                params![record.rule_id, executed_at],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        if changed == 0 {
            return Err(StrataError::not_found("rule", record.rule_id.as_str()));
        }
        conn.execute(
            "INSERT INTO rule_executions
                (rule_id, entity_id, state, confidence, success, outcomes, executed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.rule_id,
                record.entity_id,
                record.state.as_str(),
                record.confidence,
                record.success,
                serde_json::to_string(&record.outcomes)?,
                executed_at,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(())
    })
}

fn parse_state(s: &str) -> Option<ExecutionState> {
    [
        ExecutionState::Pending,
        ExecutionState::ConditionsEvaluated,
        ExecutionState::Skipped,
        ExecutionState::ActionsRunning,
        ExecutionState::Success,
        ExecutionState::PartialFailure,
        ExecutionState::Failure,
    ]
    .into_iter()
    .find(|state| state.as_str() == s)
}

pub fn executions_for(conn: &Connection, rule_id: &str) -> StrataResult<Vec<RuleExecutionRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT rule_id, entity_id, state, confidence, success, outcomes, executed_at
             FROM rule_executions WHERE rule_id = ?1 ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![rule_id], |row| {
            Ok(RuleExecutionRecord {
                rule_id: row.get(0)?,
                entity_id: row.get(1)?,
                state: super::enum_col(row, 2, parse_state)?,
                confidence: row.get(3)?,
                success: row.get(4)?,
                outcomes: json_col(row, 5)?,
                executed_at: ts_col(row, 6)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
