//! Identity & role store.
//!
//! The engine never reads ambient session state: every operation receives
//! an actor id and resolves it here. The store itself is externally owned;
//! `Directory` is the seam, `SqliteDirectory` the default implementation
//! reading the seeded `users`/`departments` tables.

use std::path::{Path, PathBuf};

use crate::db::{self, DatabaseError};
use crate::models::{Department, User};

/// Errors from directory lookups.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// A referral target: a single user or a whole department.
#[derive(Debug, Clone)]
pub enum Recipient {
    User(User),
    Department(Department),
}

impl Recipient {
    pub fn id(&self) -> &str {
        match self {
            Self::User(user) => &user.id,
            Self::Department(dept) => &dept.id,
        }
    }

    /// Display name, as the trail records it.
    pub fn name(&self) -> &str {
        match self {
            Self::User(user) => &user.name,
            Self::Department(dept) => &dept.name,
        }
    }
}

/// Lookup interface the engine depends on.
pub trait Directory: Send + Sync {
    fn get_user(&self, id: &str) -> Result<Option<User>, DirectoryError>;
    fn resolve_recipient(&self, id: &str) -> Result<Option<Recipient>, DirectoryError>;
}

/// Directory backed by the engine database's `users` and `departments`
/// tables. Opens a short-lived connection per lookup.
pub struct SqliteDirectory {
    db_path: PathBuf,
}

impl SqliteDirectory {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }
}

impl Directory for SqliteDirectory {
    fn get_user(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        let conn = db::open_database(&self.db_path)?;
        Ok(db::repository::user::get_user(&conn, id)?)
    }

    fn resolve_recipient(&self, id: &str) -> Result<Option<Recipient>, DirectoryError> {
        let conn = db::open_database(&self.db_path)?;
        if let Some(user) = db::repository::user::get_user(&conn, id)? {
            return Ok(Some(Recipient::User(user)));
        }
        if let Some(dept) = db::repository::user::get_department(&conn, id)? {
            return Ok(Some(Recipient::Department(dept)));
        }
        Ok(None)
    }
}
