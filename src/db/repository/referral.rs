use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Referral;

pub fn insert_referral(conn: &Connection, referral: &Referral) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO referrals (id, document_id, referrer_id, recipient_id, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            referral.id.to_string(),
            referral.document_id.to_string(),
            referral.referrer_id,
            referral.recipient_id,
            referral.note,
            format_datetime(referral.created_at),
        ],
    )?;
    Ok(())
}

/// All referrals for a document, newest first.
pub fn list_referrals_for_document(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<Vec<Referral>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, referrer_id, recipient_id, note, created_at
         FROM referrals WHERE document_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map(params![document_id.to_string()], |row| {
            Ok(ReferralRow {
                id: row.get::<_, String>(0)?,
                document_id: row.get::<_, String>(1)?,
                referrer_id: row.get::<_, String>(2)?,
                recipient_id: row.get::<_, String>(3)?,
                note: row.get::<_, Option<String>>(4)?,
                created_at: row.get::<_, String>(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(referral_from_row).collect()
}

/// The most recent referral, which determines who the document is assigned to.
pub fn latest_referral(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<Option<Referral>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, referrer_id, recipient_id, note, created_at
         FROM referrals WHERE document_id = ?1
         ORDER BY created_at DESC, rowid DESC LIMIT 1",
    )?;

    let result = stmt.query_row(params![document_id.to_string()], |row| {
        Ok(ReferralRow {
            id: row.get::<_, String>(0)?,
            document_id: row.get::<_, String>(1)?,
            referrer_id: row.get::<_, String>(2)?,
            recipient_id: row.get::<_, String>(3)?,
            note: row.get::<_, Option<String>>(4)?,
            created_at: row.get::<_, String>(5)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(referral_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

struct ReferralRow {
    id: String,
    document_id: String,
    referrer_id: String,
    recipient_id: String,
    note: Option<String>,
    created_at: String,
}

fn referral_from_row(row: ReferralRow) -> Result<Referral, DatabaseError> {
    Ok(Referral {
        id: parse_uuid(&row.id)?,
        document_id: parse_uuid(&row.document_id)?,
        referrer_id: row.referrer_id,
        recipient_id: row.recipient_id,
        note: row.note,
        created_at: parse_datetime(&row.created_at),
    })
}
