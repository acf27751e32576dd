use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::ActivityKind;
use crate::models::ActivityRecord;

/// Append one entry to a document's trail. The ledger is append-only;
/// there is no update or delete on this table.
pub fn append_activity(conn: &Connection, record: &ActivityRecord) -> Result<(), DatabaseError> {
    if record.detail.trim().is_empty() {
        return Err(DatabaseError::ConstraintViolation(
            "activity detail must not be blank".into(),
        ));
    }

    conn.execute(
        "INSERT INTO activity_log (id, document_id, actor, kind, detail, recipient, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id.to_string(),
            record.document_id.to_string(),
            record.actor,
            record.kind.as_str(),
            record.detail,
            record.recipient,
            format_datetime(record.created_at),
        ],
    )?;
    Ok(())
}

/// The full trail for a document, oldest first. Timestamp ties break by
/// insertion order so a replay always observes the sequence as written.
pub fn trail_for_document(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<Vec<ActivityRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, actor, kind, detail, recipient, created_at
         FROM activity_log WHERE document_id = ?1
         ORDER BY created_at ASC, rowid ASC",
    )?;

    let rows = stmt
        .query_map(params![document_id.to_string()], |row| {
            Ok(ActivityRow {
                id: row.get::<_, String>(0)?,
                document_id: row.get::<_, String>(1)?,
                actor: row.get::<_, String>(2)?,
                kind: row.get::<_, String>(3)?,
                detail: row.get::<_, String>(4)?,
                recipient: row.get::<_, Option<String>>(5)?,
                created_at: row.get::<_, String>(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(activity_from_row).collect()
}

/// Number of trail entries of a given kind, for tests and dashboards.
pub fn count_activities_of_kind(
    conn: &Connection,
    document_id: &Uuid,
    kind: ActivityKind,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM activity_log WHERE document_id = ?1 AND kind = ?2",
        params![document_id.to_string(), kind.as_str()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

struct ActivityRow {
    id: String,
    document_id: String,
    actor: String,
    kind: String,
    detail: String,
    recipient: Option<String>,
    created_at: String,
}

fn activity_from_row(row: ActivityRow) -> Result<ActivityRecord, DatabaseError> {
    Ok(ActivityRecord {
        id: parse_uuid(&row.id)?,
        document_id: parse_uuid(&row.document_id)?,
        actor: row.actor,
        kind: ActivityKind::from_str(&row.kind)?,
        detail: row.detail,
        recipient: row.recipient,
        created_at: parse_datetime(&row.created_at),
    })
}
