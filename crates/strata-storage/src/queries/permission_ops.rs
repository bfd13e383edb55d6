use rusqlite::{params, Connection};

use strata_core::errors::StrataResult;
use strata_core::models::Permission;

use crate::to_storage_err;

pub fn upsert_permission(
    conn: &Connection,
    relation_id: &str,
    permission: &Permission,
) -> StrataResult<()> {
    conn.execute(
        "INSERT INTO relation_permissions (relation_id, data_scope, action, granted)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(relation_id, data_scope, action) DO UPDATE SET granted = excluded.granted",
        params![
            relation_id,
            permission.data_scope,
            permission.action,
            permission.granted
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn permissions_for(conn: &Connection, relation_id: &str) -> StrataResult<Vec<Permission>> {
    let mut stmt = conn
        .prepare(
            "SELECT data_scope, action, granted FROM relation_permissions
             WHERE relation_id = ?1 ORDER BY data_scope, action",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![relation_id], |row| {
            Ok(Permission {
                data_scope: row.get(0)?,
                action: row.get(1)?,
                granted: row.get(2)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
