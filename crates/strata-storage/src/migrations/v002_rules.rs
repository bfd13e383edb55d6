//! v002: routing_rules, rule_executions.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS routing_rules (
            id                   TEXT PRIMARY KEY,
            organization_id      TEXT NOT NULL,
            name                 TEXT NOT NULL,
            description          TEXT,
            resource_types       TEXT NOT NULL DEFAULT '[]',
            conditions           TEXT NOT NULL DEFAULT '[]',
            actions              TEXT NOT NULL DEFAULT '[]',
            priority             INTEGER NOT NULL DEFAULT 0,
            stop_on_first_match  INTEGER NOT NULL DEFAULT 0,
            enabled              INTEGER NOT NULL DEFAULT 1,
            execution_count      INTEGER NOT NULL DEFAULT 0,
            last_executed        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_rules_org ON routing_rules(organization_id, enabled);

        CREATE TABLE IF NOT EXISTS rule_executions (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            rule_id      TEXT NOT NULL,
            entity_id    TEXT NOT NULL,
            state        TEXT NOT NULL,
            confidence   REAL NOT NULL,
            success      INTEGER NOT NULL,
            outcomes     TEXT NOT NULL DEFAULT '[]',
            executed_at  TEXT NOT NULL,
            FOREIGN KEY (rule_id) REFERENCES routing_rules(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_executions_rule ON rule_executions(rule_id);
        CREATE INDEX IF NOT EXISTS idx_executions_entity ON rule_executions(entity_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
