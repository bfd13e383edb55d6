//! Entity placements and derived tasks/projects written by rule actions.

use rusqlite::{params, Connection, OptionalExtension};

use strata_core::errors::StrataResult;
use strata_core::models::{
    Context, DerivedEntity, DerivedKind, Placement, Priority, ResourceType,
};

use super::{enum_col, ts_col};
use crate::to_storage_err;

pub fn get_placement(conn: &Connection, entity_id: &str) -> StrataResult<Option<Placement>> {
    conn.query_row(
        "SELECT entity_id, resource_type, stream_id, context, priority, updated_at
         FROM entity_placements WHERE entity_id = ?1",
        params![entity_id],
        |row| {
            let context: Option<String> = row.get(3)?;
            let priority: Option<String> = row.get(4)?;
            Ok(Placement {
                entity_id: row.get(0)?,
                resource_type: enum_col(row, 1, ResourceType::from_str_name)?,
                stream_id: row.get(2)?,
                context: context.as_deref().and_then(Context::from_str_name),
                priority: priority.as_deref().and_then(Priority::from_str_name),
                updated_at: ts_col(row, 5)?,
            })
        },
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn upsert_placement(conn: &Connection, placement: &Placement) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO entity_placements
            (entity_id, resource_type, stream_id, context, priority, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(entity_id) DO UPDATE SET
            resource_type = excluded.resource_type,
            stream_id = excluded.stream_id,
            context = excluded.context,
            priority = excluded.priority,
            updated_at = excluded.updated_at",
        params![
            placement.entity_id,
            placement.resource_type.as_str(),
            placement.stream_id,
            placement.context.map(|c| c.as_str()),
            placement.priority.map(|p| p.as_str()),
            placement.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_derived(conn: &Connection, derived: &DerivedEntity) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO derived_entities (id, kind, source_entity_id, stream_id, title, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            derived.id,
            derived.kind.as_str(),
            derived.source_entity_id,
            derived.stream_id,
            derived.title,
            derived.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn derived_from(conn: &Connection, source_entity_id: &str) -> StrataResult<Vec<DerivedEntity>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, kind, source_entity_id, stream_id, title, created_at
             FROM derived_entities WHERE source_entity_id = ?1 ORDER BY created_at, id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![source_entity_id], |row| {
            Ok(DerivedEntity {
                id: row.get(0)?,
                kind: enum_col(row, 1, DerivedKind::from_str_name)?,
                source_entity_id: row.get(2)?,
                stream_id: row.get(3)?,
                title: row.get(4)?,
                created_at: ts_col(row, 5)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
