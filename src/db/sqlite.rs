use std::path::Path;

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    // busy_timeout makes writers on different documents queue at the
    // database level instead of failing with SQLITE_BUSY.
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;
         PRAGMA busy_timeout=5000;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![
        (1, include_str!("../../resources/migrations/001_initial.sql")),
        (2, include_str!("../../resources/migrations/002_directory_seed.sql")),
    ];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // users + departments + documents + referrals + activity_log + comments + schema_version = 7
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 7, "Expected 7 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 2);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn directory_roster_seeded() {
        let conn = open_memory_database().unwrap();
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        let departments: i64 = conn
            .query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 5);
        assert_eq!(departments, 3);
    }

    #[test]
    fn status_check_constraint() {
        let conn = open_memory_database().unwrap();
        let result = conn.execute(
            "INSERT INTO documents (id, title, doc_type, owner_id, status, department, created_at)
             VALUES ('doc-1', 'Budget', 'Report', '2', 'archived', 'Finance', '2026-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn blank_activity_detail_rejected_by_schema() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO documents (id, title, doc_type, owner_id, status, department, created_at)
             VALUES ('doc-1', 'Budget', 'Report', '2', 'pending', 'Finance', '2026-01-01 00:00:00')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO activity_log (id, document_id, actor, kind, detail, created_at)
             VALUES ('act-1', 'doc-1', '2', 'upload', '   ', '2026-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn cascade_delete_removes_owned_rows() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO documents (id, title, doc_type, owner_id, status, department, created_at)
             VALUES ('doc-1', 'Budget', 'Report', '2', 'pending', 'Finance', '2026-01-01 00:00:00')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO activity_log (id, document_id, actor, kind, detail, created_at)
             VALUES ('act-1', 'doc-1', '2', 'upload', 'Document created and uploaded', '2026-01-01 00:00:00')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO comments (id, document_id, author_id, body, created_at)
             VALUES ('com-1', 'doc-1', '3', 'Looks good', '2026-01-01 00:00:00')",
            [],
        )
        .unwrap();

        conn.execute("DELETE FROM documents WHERE id = 'doc-1'", []).unwrap();

        let activities: i64 = conn
            .query_row("SELECT COUNT(*) FROM activity_log", [], |row| row.get(0))
            .unwrap();
        let comments: i64 = conn
            .query_row("SELECT COUNT(*) FROM comments", [], |row| row.get(0))
            .unwrap();
        assert_eq!(activities, 0);
        assert_eq!(comments, 0);
    }
}
