//! v001: streams, stream_relations, relation_permissions, stream_audit_log.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS streams (
            id               TEXT PRIMARY KEY,
            organization_id  TEXT NOT NULL,
            name             TEXT NOT NULL,
            description      TEXT,
            role             TEXT,
            type_tag         TEXT NOT NULL DEFAULT 'STREAM',
            status           TEXT NOT NULL DEFAULT 'ACTIVE',
            config           TEXT NOT NULL DEFAULT '{}',
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_streams_org ON streams(organization_id);
        CREATE INDEX IF NOT EXISTS idx_streams_org_role ON streams(organization_id, role);

        CREATE TABLE IF NOT EXISTS stream_relations (
            id               TEXT PRIMARY KEY,
            parent_id        TEXT NOT NULL,
            child_id         TEXT NOT NULL,
            relation_type    TEXT NOT NULL DEFAULT 'OWNS',
            inheritance      TEXT NOT NULL DEFAULT 'INHERIT_DOWN',
            active           INTEGER NOT NULL DEFAULT 1,
            created_by       TEXT,
            created_at       TEXT NOT NULL,
            deactivated_at   TEXT,
            FOREIGN KEY (parent_id) REFERENCES streams(id) ON DELETE CASCADE,
            FOREIGN KEY (child_id) REFERENCES streams(id) ON DELETE CASCADE,
            CHECK (parent_id <> child_id)
        );

        CREATE INDEX IF NOT EXISTS idx_relations_parent ON stream_relations(parent_id, active);
        CREATE INDEX IF NOT EXISTS idx_relations_child ON stream_relations(child_id, active);

        CREATE TABLE IF NOT EXISTS relation_permissions (
            relation_id  TEXT NOT NULL,
            data_scope   TEXT NOT NULL,
            action       TEXT NOT NULL,
            granted      INTEGER NOT NULL,
            PRIMARY KEY (relation_id, data_scope, action),
            FOREIGN KEY (relation_id) REFERENCES stream_relations(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS stream_audit_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            stream_id   TEXT NOT NULL,
            operation   TEXT NOT NULL,
            actor       TEXT NOT NULL DEFAULT 'system',
            details     TEXT NOT NULL DEFAULT '{}',
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_audit_stream ON stream_audit_log(stream_id);
        CREATE INDEX IF NOT EXISTS idx_audit_operation ON stream_audit_log(operation);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
