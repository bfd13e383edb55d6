//! Stream CRUD and batched status changes.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{Relation, Stream, StreamRole, StreamStatus};

use super::{enum_col, in_transaction, json_col, relation_ops, ts_col};
use crate::to_storage_err;

const STREAM_COLUMNS: &str =
    "id, organization_id, name, description, role, type_tag, status, config, created_at, updated_at";

fn stream_from_row(row: &Row<'_>) -> rusqlite::Result<Stream> {
    let role: Option<String> = row.get(4)?;
    Ok(Stream {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        role: role.as_deref().and_then(StreamRole::from_str_name),
        type_tag: row.get(5)?,
        status: enum_col(row, 6, StreamStatus::from_str_name)?,
        config: json_col(row, 7)?,
        created_at: ts_col(row, 8)?,
        updated_at: ts_col(row, 9)?,
    })
}

pub fn insert_stream(conn: &Connection, stream: &Stream) -> StrataResult<()> {
    let config = serde_json::to_string(&stream.config)?;
    conn.execute(
        "INSERT INTO streams
            (id, organization_id, name, description, role, type_tag, status, config, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            stream.id,
            stream.organization_id,
            stream.name,
            stream.description,
            stream.role.map(|r| r.as_str()),
            stream.type_tag,
            stream.status.as_str(),
            config,
            stream.created_at.to_rfc3339(),
            stream.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_stream(conn: &Connection, id: &str) -> StrataResult<Option<Stream>> {
    conn.query_row(
        &format!("SELECT {STREAM_COLUMNS} FROM streams WHERE id = ?1"),
        params![id],
        stream_from_row,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn list_streams(conn: &Connection, organization_id: Option<&str>) -> StrataResult<Vec<Stream>> {
    let sql = match organization_id {
        Some(_) => format!(
            "SELECT {STREAM_COLUMNS} FROM streams WHERE organization_id = ?1 ORDER BY created_at, id"
        ),
        None => format!("SELECT {STREAM_COLUMNS} FROM streams ORDER BY created_at, id"),
    };
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = match organization_id {
        Some(org) => stmt.query_map(params![org], stream_from_row),
        None => stmt.query_map([], stream_from_row),
    }
    .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn update_config(conn: &Connection, id: &str, config: &serde_json::Value) -> StrataResult<()> {
    let raw = serde_json::to_string(config)?;
    let changed = conn
        .execute(
            "UPDATE streams SET config = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, raw, Utc::now().to_rfc3339()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(StrataError::not_found("stream", id));
    }
    Ok(())
}

/// Apply every status change or none of them.
pub fn set_statuses(conn: &Connection, changes: &[(String, StreamStatus)]) -> StrataResult<()> {
    if changes.is_empty() {
        return Ok(());
    }
    in_transaction(conn, |conn| {
        let now = Utc::now().to_rfc3339();
        let mut stmt = conn
            .prepare("UPDATE streams SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .map_err(|e| to_storage_err(e.to_string()))?;
        for (id, status) in changes {
            let changed = stmt
                .execute(params![id, status.as_str(), now])
                .map_err(|e| to_storage_err(e.to_string()))?;
            if changed == 0 {
                return Err(StrataError::not_found("stream", id.as_str()));
            }
        }
        Ok(())
    })
}

pub fn count_active_children(conn: &Connection, id: &str) -> StrataResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM stream_relations WHERE parent_id = ?1 AND active = 1",
            params![id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

/// Hard delete. Inactive edges, permissions and the embedding cascade with
/// the row; the purged edges are read inside the same transaction and returned.
pub fn delete_stream(conn: &Connection, id: &str) -> StrataResult<Vec<Relation>> {
    in_transaction(conn, |conn| {
        let children = count_active_children(conn, id)?;
        if children > 0 {
            return Err(StrataError::HasChildren {
                id: id.to_string(),
                children,
            });
        }
        let purged = relation_ops::relations_touching(conn, id)?;
        let deleted = conn
            .execute("DELETE FROM streams WHERE id = ?1", params![id])
            .map_err(|e| to_storage_err(e.to_string()))?;
        if deleted == 0 {
            return Err(StrataError::not_found("stream", id));
        }
        Ok(purged)
    })
}
