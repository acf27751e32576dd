use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::UserRole;
use crate::models::{Department, User};

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, department, role, position)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.id,
            user.name,
            user.department,
            user.role.as_str(),
            user.position,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, department, role, position FROM users WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok((id, name, department, role, position)) => Ok(Some(User {
            id,
            name,
            department,
            role: UserRole::from_str(&role)?,
            position,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_users(conn: &Connection) -> Result<Vec<User>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, department, role, position FROM users ORDER BY id",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, name, department, role, position)| {
            Ok(User {
                id,
                name,
                department,
                role: UserRole::from_str(&role)?,
                position,
            })
        })
        .collect()
}

pub fn get_department(conn: &Connection, id: &str) -> Result<Option<Department>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name FROM departments WHERE id = ?1",
        params![id],
        |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    );

    match result {
        Ok(dept) => Ok(Some(dept)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_departments(conn: &Connection) -> Result<Vec<Department>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM departments ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Department {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
