use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::DocumentStatus;
use crate::models::{Document, DocumentFilter};

pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, title, description, doc_type, owner_id, status, department, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            doc.id.to_string(),
            doc.title,
            doc.description,
            doc.doc_type,
            doc.owner_id,
            doc.status.as_str(),
            doc.department,
            format_datetime(doc.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, description, doc_type, owner_id, status, department, created_at
         FROM documents WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok(DocumentRow {
            id: row.get::<_, String>(0)?,
            title: row.get::<_, String>(1)?,
            description: row.get::<_, Option<String>>(2)?,
            doc_type: row.get::<_, String>(3)?,
            owner_id: row.get::<_, String>(4)?,
            status: row.get::<_, String>(5)?,
            department: row.get::<_, String>(6)?,
            created_at: row.get::<_, String>(7)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Set a document's status. Returns false if the document does not exist.
pub fn update_document_status(
    conn: &Connection,
    id: &Uuid,
    status: DocumentStatus,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE documents SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.to_string()],
    )?;
    Ok(updated > 0)
}

pub fn list_documents(
    conn: &Connection,
    filter: &DocumentFilter,
) -> Result<Vec<Document>, DatabaseError> {
    use rusqlite::types::Value;

    let mut sql = String::from(
        "SELECT id, title, description, doc_type, owner_id, status, department, created_at
         FROM documents WHERE 1=1",
    );
    let mut params_vec: Vec<Value> = Vec::new();

    if let Some(status) = filter.status {
        sql.push_str(" AND status = ?");
        params_vec.push(Value::Text(status.as_str().to_string()));
    }
    if let Some(ref owner_id) = filter.owner_id {
        sql.push_str(" AND owner_id = ?");
        params_vec.push(Value::Text(owner_id.clone()));
    }
    if let Some(ref department) = filter.department {
        sql.push_str(" AND department = ?");
        params_vec.push(Value::Text(department.clone()));
    }

    sql.push_str(" ORDER BY created_at DESC, rowid DESC");

    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(Value::Integer(limit as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), |row| {
            Ok(DocumentRow {
                id: row.get::<_, String>(0)?,
                title: row.get::<_, String>(1)?,
                description: row.get::<_, Option<String>>(2)?,
                doc_type: row.get::<_, String>(3)?,
                owner_id: row.get::<_, String>(4)?,
                status: row.get::<_, String>(5)?,
                department: row.get::<_, String>(6)?,
                created_at: row.get::<_, String>(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(document_from_row).collect()
}

/// Case-insensitive title/description search for the document feed.
pub fn search_documents(conn: &Connection, query: &str) -> Result<Vec<Document>, DatabaseError> {
    let pattern = format!("%{}%", query.trim());
    let mut stmt = conn.prepare(
        "SELECT id, title, description, doc_type, owner_id, status, department, created_at
         FROM documents
         WHERE title LIKE ?1 OR description LIKE ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map(params![pattern], |row| {
            Ok(DocumentRow {
                id: row.get::<_, String>(0)?,
                title: row.get::<_, String>(1)?,
                description: row.get::<_, Option<String>>(2)?,
                doc_type: row.get::<_, String>(3)?,
                owner_id: row.get::<_, String>(4)?,
                status: row.get::<_, String>(5)?,
                department: row.get::<_, String>(6)?,
                created_at: row.get::<_, String>(7)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(document_from_row).collect()
}

/// Documents per status, for the dashboard tiles. Statuses with no
/// documents are included with a zero count.
pub fn count_by_status(conn: &Connection) -> Result<Vec<(DocumentStatus, i64)>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM documents GROUP BY status")?;
    let counted = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let all = [
        DocumentStatus::Pending,
        DocumentStatus::InReview,
        DocumentStatus::Referred,
        DocumentStatus::Completed,
    ];
    all.iter()
        .map(|status| {
            let count = counted
                .iter()
                .find(|(s, _)| s == status.as_str())
                .map(|(_, n)| *n)
                .unwrap_or(0);
            Ok((*status, count))
        })
        .collect()
}

// Internal row type for Document mapping
struct DocumentRow {
    id: String,
    title: String,
    description: Option<String>,
    doc_type: String,
    owner_id: String,
    status: String,
    department: String,
    created_at: String,
}

fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: parse_uuid(&row.id)?,
        title: row.title,
        description: row.description,
        doc_type: row.doc_type,
        owner_id: row.owner_id,
        status: DocumentStatus::from_str(&row.status)?,
        department: row.department,
        created_at: parse_datetime(&row.created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::NaiveDate;

    fn sample_document(title: &str, owner: &str, status: DocumentStatus, day: u32) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            doc_type: "Budget Proposal".into(),
            owner_id: owner.to_string(),
            status,
            department: "Finance".into(),
            created_at: NaiveDate::from_ymd_opt(2026, 3, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let doc = sample_document("Budget Proposal FY 2027", "2", DocumentStatus::Pending, 1);
        insert_document(&conn, &doc).unwrap();

        let loaded = get_document(&conn, &doc.id).unwrap().unwrap();
        assert_eq!(loaded.title, doc.title);
        assert_eq!(loaded.status, DocumentStatus::Pending);
        assert_eq!(loaded.owner_id, "2");
        assert_eq!(loaded.created_at, doc.created_at);
    }

    #[test]
    fn get_missing_document_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_document(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn update_status_persists() {
        let conn = open_memory_database().unwrap();
        let doc = sample_document("Internal Memo", "2", DocumentStatus::Pending, 1);
        insert_document(&conn, &doc).unwrap();

        let updated = update_document_status(&conn, &doc.id, DocumentStatus::InReview).unwrap();
        assert!(updated);

        let loaded = get_document(&conn, &doc.id).unwrap().unwrap();
        assert_eq!(loaded.status, DocumentStatus::InReview);
    }

    #[test]
    fn update_status_on_missing_document_returns_false() {
        let conn = open_memory_database().unwrap();
        let updated =
            update_document_status(&conn, &Uuid::new_v4(), DocumentStatus::Completed).unwrap();
        assert!(!updated);
    }

    #[test]
    fn list_filters_by_status_and_owner() {
        let conn = open_memory_database().unwrap();
        insert_document(&conn, &sample_document("A", "2", DocumentStatus::Pending, 1)).unwrap();
        insert_document(&conn, &sample_document("B", "2", DocumentStatus::Completed, 2)).unwrap();
        insert_document(&conn, &sample_document("C", "5", DocumentStatus::Pending, 3)).unwrap();

        let pending = list_documents(
            &conn,
            &DocumentFilter {
                status: Some(DocumentStatus::Pending),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(pending.len(), 2);

        let sarahs = list_documents(
            &conn,
            &DocumentFilter {
                owner_id: Some("2".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(sarahs.len(), 2);
    }

    #[test]
    fn list_is_newest_first_and_respects_limit() {
        let conn = open_memory_database().unwrap();
        insert_document(&conn, &sample_document("Old", "2", DocumentStatus::Pending, 1)).unwrap();
        insert_document(&conn, &sample_document("New", "2", DocumentStatus::Pending, 9)).unwrap();

        let docs = list_documents(
            &conn,
            &DocumentFilter {
                limit: Some(1),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "New");
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let conn = open_memory_database().unwrap();
        insert_document(
            &conn,
            &sample_document("Budget Proposal FY 2027", "2", DocumentStatus::Pending, 1),
        )
        .unwrap();
        insert_document(&conn, &sample_document("Meeting Minutes", "5", DocumentStatus::Pending, 2))
            .unwrap();

        let hits = search_documents(&conn, "budget").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Budget Proposal FY 2027");
    }

    #[test]
    fn search_matches_description_too() {
        let conn = open_memory_database().unwrap();
        let mut doc = sample_document("Q3 Report", "2", DocumentStatus::Pending, 1);
        doc.description = Some("Projected expenditures for the fiscal year".into());
        insert_document(&conn, &doc).unwrap();

        let hits = search_documents(&conn, "fiscal").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Q3 Report");
    }

    #[test]
    fn count_by_status_includes_empty_statuses() {
        let conn = open_memory_database().unwrap();
        insert_document(&conn, &sample_document("A", "2", DocumentStatus::Pending, 1)).unwrap();
        insert_document(&conn, &sample_document("B", "2", DocumentStatus::Pending, 2)).unwrap();
        insert_document(&conn, &sample_document("C", "2", DocumentStatus::Referred, 3)).unwrap();

        let counts = count_by_status(&conn).unwrap();
        assert_eq!(counts.len(), 4);
        assert!(counts.contains(&(DocumentStatus::Pending, 2)));
        assert!(counts.contains(&(DocumentStatus::Referred, 1)));
        assert!(counts.contains(&(DocumentStatus::Completed, 0)));
    }
}
