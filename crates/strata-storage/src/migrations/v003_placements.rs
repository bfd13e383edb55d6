//! v003: entity_placements, derived_entities.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS entity_placements (
            entity_id      TEXT PRIMARY KEY,
            resource_type  TEXT NOT NULL,
            stream_id      TEXT,
            context        TEXT,
            priority       TEXT,
            updated_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_placements_stream ON entity_placements(stream_id);

        CREATE TABLE IF NOT EXISTS derived_entities (
            id                TEXT PRIMARY KEY,
            kind              TEXT NOT NULL,
            source_entity_id  TEXT NOT NULL,
            stream_id         TEXT,
            title             TEXT NOT NULL,
            created_at        TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_derived_source ON derived_entities(source_entity_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
