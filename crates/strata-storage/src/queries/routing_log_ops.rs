use rusqlite::{params, Connection};

use strata_core::errors::StrataResult;
use strata_core::models::RoutingResult;

use super::json_col;
use crate::to_storage_err;

pub fn append(conn: &Connection, organization_id: &str, result: &RoutingResult) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO routing_log
            (organization_id, entity_id, target_stream_id, stage, confidence, fallback_used, result)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            organization_id,
            result.entity_id,
            result.target_stream_id,
            result.stage.as_str(),
            result.confidence,
            result.fallback_used,
            serde_json::to_string(result)?,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Decisions for one entity, oldest first.
pub fn history(conn: &Connection, entity_id: &str) -> StrataResult<Vec<RoutingResult>> {
    let mut stmt = conn
        .prepare("SELECT result FROM routing_log WHERE entity_id = ?1 ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![entity_id], |row| json_col(row, 0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
