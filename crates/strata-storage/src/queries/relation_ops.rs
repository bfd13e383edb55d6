//! Relation edges: guarded inserts, soft deletes, and the transactional move.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use strata_core::errors::{StrataError, StrataResult};
use strata_core::models::{InheritanceRule, Relation, RelationType, Stream};

use super::{enum_col, in_transaction, opt_ts_col, stream_ops, ts_col};
use crate::to_storage_err;

const RELATION_COLUMNS: &str =
    "id, parent_id, child_id, relation_type, inheritance, active, created_by, created_at, deactivated_at";

fn relation_from_row(row: &Row<'_>) -> rusqlite::Result<Relation> {
    Ok(Relation {
        id: row.get(0)?,
        parent_id: row.get(1)?,
        child_id: row.get(2)?,
        relation_type: enum_col(row, 3, RelationType::from_str_name)?,
        inheritance: enum_col(row, 4, InheritanceRule::from_str_name)?,
        active: row.get(5)?,
        created_by: row.get(6)?,
        created_at: ts_col(row, 7)?,
        deactivated_at: opt_ts_col(row, 8)?,
    })
}

fn query_relations(
    conn: &Connection,
    where_clause: &str,
    args: &[&dyn rusqlite::types::ToSql],
) -> StrataResult<Vec<Relation>> {
    let sql = format!(
        "SELECT {RELATION_COLUMNS} FROM stream_relations WHERE {where_clause} ORDER BY created_at, id"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(args, relation_from_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_relation(conn: &Connection, id: &str) -> StrataResult<Option<Relation>> {
    conn.query_row(
        &format!("SELECT {RELATION_COLUMNS} FROM stream_relations WHERE id = ?1"),
        params![id],
        relation_from_row,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn active_relations(conn: &Connection) -> StrataResult<Vec<Relation>> {
    query_relations(conn, "active = 1", &[])
}

pub fn parents_of(conn: &Connection, child_id: &str) -> StrataResult<Vec<Relation>> {
    query_relations(conn, "child_id = ?1 AND active = 1", &[&child_id])
}

pub fn children_of(conn: &Connection, parent_id: &str) -> StrataResult<Vec<Relation>> {
    query_relations(conn, "parent_id = ?1 AND active = 1", &[&parent_id])
}

/// Whether `to` is reachable from `from` over active edges. `from` reaches itself.
///
/// `UNION` (not `UNION ALL`) deduplicates visited rows, so the recursion
/// terminates even if the stored edges already contain a cycle.
pub fn reachable(conn: &Connection, from: &str, to: &str) -> StrataResult<bool> {
    let hit: Option<i64> = conn
        .query_row(
            "WITH RECURSIVE reach(id) AS (
                SELECT ?1
                UNION
                SELECT r.child_id FROM stream_relations r
                JOIN reach ON r.parent_id = reach.id
                WHERE r.active = 1
             )
             SELECT 1 FROM reach WHERE id = ?2 LIMIT 1",
            params![from, to],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(hit.is_some())
}

fn stream_exists(conn: &Connection, id: &str) -> StrataResult<bool> {
    let hit: Option<i64> = conn
        .query_row("SELECT 1 FROM streams WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(hit.is_some())
}

/// Existence, self-edge, duplicate, and cycle checks for a prospective edge.
fn check_edge(conn: &Connection, relation: &Relation) -> StrataResult<()> {
    for id in [&relation.parent_id, &relation.child_id] {
        if !stream_exists(conn, id)? {
            return Err(StrataError::not_found("stream", id.as_str()));
        }
    }
    if relation.parent_id == relation.child_id {
        return Err(StrataError::CycleDetected {
            path: format!("{} -> {}", relation.parent_id, relation.child_id),
        });
    }
    let duplicate: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM stream_relations
             WHERE parent_id = ?1 AND child_id = ?2 AND active = 1 LIMIT 1",
            params![relation.parent_id, relation.child_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    if duplicate.is_some() {
        return Err(StrataError::invalid(
            "parentId",
            format!(
                "active edge {} -> {} already exists",
                relation.parent_id, relation.child_id
            ),
        ));
    }
    if reachable(conn, &relation.child_id, &relation.parent_id)? {
        return Err(StrataError::CycleDetected {
            path: format!(
                "{} -> {} -> ... -> {}",
                relation.parent_id, relation.child_id, relation.parent_id
            ),
        });
    }
    Ok(())
}

fn insert_relation_row(conn: &Connection, relation: &Relation) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO stream_relations
            (id, parent_id, child_id, relation_type, inheritance, active, created_by, created_at, deactivated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            relation.id,
            relation.parent_id,
            relation.child_id,
            relation.relation_type.as_str(),
            relation.inheritance.as_str(),
            relation.active,
            relation.created_by,
            relation.created_at.to_rfc3339(),
            relation.deactivated_at.map(|d| d.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Insert an active edge after re-checking the graph inside the transaction.
pub fn add_relation(conn: &Connection, relation: &Relation) -> StrataResult<()> {
    in_transaction(conn, |conn| {
        check_edge(conn, relation)?;
        insert_relation_row(conn, relation)
    })
}

/// Every edge touching `stream_id`, active or not, oldest first.
pub fn relations_touching(conn: &Connection, stream_id: &str) -> StrataResult<Vec<Relation>> {
    query_relations(conn, "parent_id = ?1 OR child_id = ?1", &[&stream_id])
}

/// Insert `stream` and its first edge `edge` in one transaction.
pub fn create_child(conn: &Connection, stream: &Stream, edge: &Relation) -> StrataResult<()> {
    if edge.child_id != stream.id {
        return Err(StrataError::invalid(
            "childId",
            format!("edge child {} does not match {}", edge.child_id, stream.id),
        ));
    }
    in_transaction(conn, |conn| {
        stream_ops::insert_stream(conn, stream)?;
        check_edge(conn, edge)?;
        insert_relation_row(conn, edge)
    })
}

pub fn deactivate_relation(conn: &Connection, id: &str) -> StrataResult<()> {
    let changed = conn
        .execute(
            "UPDATE stream_relations SET active = 0, deactivated_at = ?2
             WHERE id = ?1 AND active = 1",
            params![id, Utc::now().to_rfc3339()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(StrataError::not_found("relation", id));
    }
    Ok(())
}

/// Re-parent `child_id`: deactivate every active parent edge and insert
/// `new_edge`, all in one `BEGIN IMMEDIATE` transaction.
pub fn move_stream(
    conn: &Connection,
    child_id: &str,
    new_edge: Option<&Relation>,
) -> StrataResult<Vec<String>> {
    in_transaction(conn, |conn| {
        if !stream_exists(conn, child_id)? {
            return Err(StrataError::not_found("stream", child_id));
        }
        if let Some(edge) = new_edge {
            if edge.child_id != child_id {
                return Err(StrataError::invalid(
                    "childId",
                    format!("edge child {} does not match {child_id}", edge.child_id),
                ));
            }
        }

        let old_ids: Vec<String> = parents_of(conn, child_id)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let now = Utc::now().to_rfc3339();
        for id in &old_ids {
            conn.execute(
                "UPDATE stream_relations SET active = 0, deactivated_at = ?2 WHERE id = ?1",
                params![id, now],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        }

        if let Some(edge) = new_edge {
            check_edge(conn, edge)?;
            insert_relation_row(conn, edge)?;
        }
        Ok(old_ids)
    })
}
