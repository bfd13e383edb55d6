use rusqlite::{params, Connection};

use strata_core::errors::StrataResult;
use strata_core::models::{AuditEntry, AuditOperation};

use super::{enum_col, json_col, ts_col};
use crate::to_storage_err;

pub fn insert_audit_entry(conn: &Connection, entry: &AuditEntry) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO stream_audit_log (stream_id, operation, actor, details, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            entry.stream_id,
            entry.operation.as_str(),
            entry.actor,
            serde_json::to_string(&entry.details)?,
            entry.timestamp.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn query_by_stream(conn: &Connection, stream_id: &str) -> StrataResult<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT stream_id, operation, actor, details, timestamp
             FROM stream_audit_log WHERE stream_id = ?1 ORDER BY id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![stream_id], |row| {
            Ok(AuditEntry {
                stream_id: row.get(0)?,
                operation: enum_col(row, 1, AuditOperation::from_str_name)?,
                actor: row.get(2)?,
                details: json_col(row, 3)?,
                timestamp: ts_col(row, 4)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
