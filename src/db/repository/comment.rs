use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::db::DatabaseError;
use crate::models::Comment;

pub fn insert_comment(conn: &Connection, comment: &Comment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO comments (id, document_id, author_id, body, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            comment.id.to_string(),
            comment.document_id.to_string(),
            comment.author_id,
            comment.body,
            format_datetime(comment.created_at),
        ],
    )?;
    Ok(())
}

/// Comments for a document, newest first (the thread renders latest on top).
pub fn list_comments_for_document(
    conn: &Connection,
    document_id: &Uuid,
) -> Result<Vec<Comment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, author_id, body, created_at
         FROM comments WHERE document_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map(params![document_id.to_string()], |row| {
            Ok(CommentRow {
                id: row.get::<_, String>(0)?,
                document_id: row.get::<_, String>(1)?,
                author_id: row.get::<_, String>(2)?,
                body: row.get::<_, String>(3)?,
                created_at: row.get::<_, String>(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(comment_from_row).collect()
}

struct CommentRow {
    id: String,
    document_id: String,
    author_id: String,
    body: String,
    created_at: String,
}

fn comment_from_row(row: CommentRow) -> Result<Comment, DatabaseError> {
    Ok(Comment {
        id: parse_uuid(&row.id)?,
        document_id: parse_uuid(&row.document_id)?,
        author_id: row.author_id,
        body: row.body,
        created_at: parse_datetime(&row.created_at),
    })
}
