//! Workflow engine facade.
//!
//! `Engine` is the single entry point for request-handling collaborators:
//! it owns the database path, the per-document lock registry, and the
//! directory seam. Every mutating operation resolves the actor, evaluates
//! the permission table, takes the document's exclusive lock with a bounded
//! wait, and applies the status mutation together with its trail entry in
//! one SQLite transaction. A rejected operation performs zero mutation and
//! writes zero trail rows.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, repository, DatabaseError};
use crate::directory::{Directory, DirectoryError, SqliteDirectory};
use crate::models::enums::{ActivityKind, DocumentStatus};
use crate::models::{
    ActivityRecord, Comment, Document, DocumentFilter, DocumentMeta, Referral, User, SYSTEM_ACTOR,
};
use crate::permissions::{self, Action};
use crate::workflow::{self, Transition};

/// Default bound on waiting for a document's lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

// ═══════════════════════════════════════════════════════════
// Error types
// ═══════════════════════════════════════════════════════════

/// Errors from engine operations. All recoverable by the caller.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Invalid document status: {0}")]
    InvalidStatus(String),
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),
    #[error("Comment text is empty")]
    EmptyComment,
    #[error("Invalid activity record: {0}")]
    InvalidRecord(String),
    #[error("Not found: {entity} {id}")]
    NotFound { entity: String, id: String },
    #[error("Document is busy, retry later")]
    Busy,
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl EngineError {
    fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Actor
// ═══════════════════════════════════════════════════════════

/// Who performed an action, as recorded on trail entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A directory user, by id.
    User(String),
    /// Engine-internal or collaborator-driven activity with no user behind it.
    System,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "{id}"),
            Self::System => write!(f, "{SYSTEM_ACTOR}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Per-document locks
// ═══════════════════════════════════════════════════════════

/// Registry of currently-locked document ids. Acquisition waits on a
/// condvar up to a deadline; the guard releases and notifies on drop, so
/// an abandoned caller that never acquired leaves no trace.
struct DocumentLocks {
    held: Mutex<HashSet<Uuid>>,
    released: Condvar,
}

impl DocumentLocks {
    fn new() -> Self {
        Self {
            held: Mutex::new(HashSet::new()),
            released: Condvar::new(),
        }
    }

    fn acquire(&self, id: Uuid, timeout: Duration) -> Result<DocumentGuard<'_>, EngineError> {
        let deadline = Instant::now() + timeout;
        let mut held = self.held.lock().map_err(|_| EngineError::LockPoisoned)?;

        while held.contains(&id) {
            let remaining = deadline
                .checked_duration_since(Instant::now())
                .ok_or(EngineError::Busy)?;
            let (guard, wait) = self
                .released
                .wait_timeout(held, remaining)
                .map_err(|_| EngineError::LockPoisoned)?;
            held = guard;
            if wait.timed_out() && held.contains(&id) {
                return Err(EngineError::Busy);
            }
        }

        held.insert(id);
        Ok(DocumentGuard { locks: self, id })
    }

    fn release(&self, id: &Uuid) {
        if let Ok(mut held) = self.held.lock() {
            held.remove(id);
        }
        self.released.notify_all();
    }
}

struct DocumentGuard<'a> {
    locks: &'a DocumentLocks,
    id: Uuid,
}

impl Drop for DocumentGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(&self.id);
    }
}

// ═══════════════════════════════════════════════════════════
// Engine
// ═══════════════════════════════════════════════════════════

pub struct Engine {
    db_path: PathBuf,
    directory: Box<dyn Directory>,
    locks: DocumentLocks,
    lock_timeout: Duration,
}

impl Engine {
    /// Open the engine over a database file, running migrations, with the
    /// database-backed directory.
    pub fn open(db_path: &Path) -> Result<Self, EngineError> {
        let directory = Box::new(SqliteDirectory::new(db_path));
        Self::open_with_directory(db_path, directory)
    }

    /// Open with an externally-owned directory implementation.
    pub fn open_with_directory(
        db_path: &Path,
        directory: Box<dyn Directory>,
    ) -> Result<Self, EngineError> {
        // Open once up front so migrations run before the first operation.
        db::open_database(db_path)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
            directory,
            locks: DocumentLocks::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Bound on waiting for a contended document before returning `Busy`.
    pub fn set_lock_timeout(&mut self, timeout: Duration) {
        self.lock_timeout = timeout;
    }

    fn open_conn(&self) -> Result<Connection, EngineError> {
        Ok(db::open_database(&self.db_path)?)
    }

    fn resolve_actor(&self, actor_id: &str) -> Result<User, EngineError> {
        self.directory
            .get_user(actor_id)?
            .ok_or_else(|| EngineError::not_found("user", actor_id))
    }

    // ── Inbound operations: mutations ───────────────────────

    /// Register a new document. It starts at `pending` with one `upload`
    /// trail entry; both rows land in the same transaction.
    pub fn upload_document(
        &self,
        meta: DocumentMeta,
        owner_id: &str,
    ) -> Result<Document, EngineError> {
        let owner = self.resolve_actor(owner_id)?;
        if !permissions::evaluate(owner.role, Action::Upload, true).allowed {
            return Err(EngineError::PermissionDenied);
        }

        let doc = Document {
            id: Uuid::new_v4(),
            title: meta.title,
            description: meta.description,
            doc_type: meta.doc_type,
            owner_id: owner.id.clone(),
            status: DocumentStatus::Pending,
            department: meta.department,
            created_at: Utc::now().naive_utc(),
        };

        let mut conn = self.open_conn()?;
        let tx = conn.transaction().map_err(DatabaseError::from)?;
        repository::document::insert_document(&tx, &doc)?;
        repository::activity::append_activity(
            &tx,
            &ActivityRecord {
                id: Uuid::new_v4(),
                document_id: doc.id,
                actor: owner.id.clone(),
                kind: ActivityKind::Upload,
                detail: "Document created and uploaded".into(),
                recipient: None,
                created_at: doc.created_at,
            },
        )?;
        tx.commit().map_err(DatabaseError::from)?;

        tracing::debug!(document_id = %doc.id, owner = %owner.id, "Document uploaded");
        Ok(doc)
    }

    /// Change a document's status. Fails with `InvalidStatus` for anything
    /// outside the four workflow statuses and `PermissionDenied` when the
    /// actor's role (with the ownership flag) does not allow it.
    pub fn transition(
        &self,
        document_id: &Uuid,
        new_status: &str,
        actor_id: &str,
    ) -> Result<Document, EngineError> {
        let target = workflow::parse_target_status(new_status)
            .ok_or_else(|| EngineError::InvalidStatus(new_status.to_string()))?;
        let actor = self.resolve_actor(actor_id)?;

        let _guard = self.locks.acquire(*document_id, self.lock_timeout)?;
        let mut conn = self.open_conn()?;

        let mut doc = repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;

        let owns = doc.owner_id == actor.id;
        if !permissions::evaluate(actor.role, Action::ChangeStatus, owns).allowed {
            return Err(EngineError::PermissionDenied);
        }

        let transition = Transition::new(doc.status, target);
        let tx = conn.transaction().map_err(DatabaseError::from)?;
        repository::document::update_document_status(&tx, document_id, target)?;
        repository::activity::append_activity(
            &tx,
            &ActivityRecord {
                id: Uuid::new_v4(),
                document_id: *document_id,
                actor: actor.id.clone(),
                kind: ActivityKind::StatusChange,
                detail: transition.detail(),
                recipient: None,
                created_at: Utc::now().naive_utc(),
            },
        )?;
        tx.commit().map_err(DatabaseError::from)?;

        tracing::debug!(
            document_id = %document_id,
            from = transition.from.as_str(),
            to = transition.to.as_str(),
            "Document status changed"
        );
        doc.status = target;
        Ok(doc)
    }

    /// Forward a document to a user or department. Creates the immutable
    /// referral, forces the status to `referred`, and records one
    /// `referral` trail entry, all in the same transaction.
    pub fn refer(
        &self,
        document_id: &Uuid,
        referrer_id: &str,
        recipient_id: &str,
        note: Option<&str>,
    ) -> Result<Referral, EngineError> {
        let referrer = self.resolve_actor(referrer_id)?;
        if !permissions::evaluate(referrer.role, Action::Refer, false).allowed {
            return Err(EngineError::PermissionDenied);
        }

        let recipient = self
            .directory
            .resolve_recipient(recipient_id)?
            .ok_or_else(|| EngineError::UnknownRecipient(recipient_id.to_string()))?;

        let note = note.map(str::trim).filter(|n| !n.is_empty()).map(String::from);

        let _guard = self.locks.acquire(*document_id, self.lock_timeout)?;
        let mut conn = self.open_conn()?;

        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;

        let referral = Referral {
            id: Uuid::new_v4(),
            document_id: *document_id,
            referrer_id: referrer.id.clone(),
            recipient_id: recipient.id().to_string(),
            note,
            created_at: Utc::now().naive_utc(),
        };

        let tx = conn.transaction().map_err(DatabaseError::from)?;
        repository::referral::insert_referral(&tx, &referral)?;
        repository::document::update_document_status(&tx, document_id, DocumentStatus::Referred)?;
        repository::activity::append_activity(
            &tx,
            &ActivityRecord {
                id: Uuid::new_v4(),
                document_id: *document_id,
                actor: referrer.id.clone(),
                kind: ActivityKind::Referral,
                detail: format!("Referred to {}", recipient.name()),
                recipient: Some(recipient.id().to_string()),
                created_at: referral.created_at,
            },
        )?;
        tx.commit().map_err(DatabaseError::from)?;

        tracing::debug!(
            document_id = %document_id,
            referrer = %referrer.id,
            recipient = recipient.id(),
            "Document referred"
        );
        Ok(referral)
    }

    /// Attach a remark to a document. Blank text (after trimming) fails
    /// with `EmptyComment`; success appends the comment and one `comment`
    /// trail entry together.
    pub fn post_comment(
        &self,
        document_id: &Uuid,
        author_id: &str,
        text: &str,
    ) -> Result<Comment, EngineError> {
        let author = self.resolve_actor(author_id)?;
        if !permissions::evaluate(author.role, Action::Comment, false).allowed {
            return Err(EngineError::PermissionDenied);
        }

        let body = text.trim();
        if body.is_empty() {
            return Err(EngineError::EmptyComment);
        }

        let _guard = self.locks.acquire(*document_id, self.lock_timeout)?;
        let mut conn = self.open_conn()?;

        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;

        let comment = Comment {
            id: Uuid::new_v4(),
            document_id: *document_id,
            author_id: author.id.clone(),
            body: body.to_string(),
            created_at: Utc::now().naive_utc(),
        };

        let tx = conn.transaction().map_err(DatabaseError::from)?;
        repository::comment::insert_comment(&tx, &comment)?;
        repository::activity::append_activity(
            &tx,
            &ActivityRecord {
                id: Uuid::new_v4(),
                document_id: *document_id,
                actor: author.id.clone(),
                kind: ActivityKind::Comment,
                detail: "Added comment".into(),
                recipient: None,
                created_at: comment.created_at,
            },
        )?;
        tx.commit().map_err(DatabaseError::from)?;

        Ok(comment)
    }

    /// Append an activity entry directly, for collaborator-driven events
    /// that have no dedicated operation. Fails with `InvalidRecord` on
    /// blank detail; never mutates the document itself.
    pub fn record_activity(
        &self,
        document_id: &Uuid,
        actor: Actor,
        kind: ActivityKind,
        detail: &str,
        recipient: Option<&str>,
    ) -> Result<ActivityRecord, EngineError> {
        if detail.trim().is_empty() {
            return Err(EngineError::InvalidRecord("detail must not be blank".into()));
        }

        let _guard = self.locks.acquire(*document_id, self.lock_timeout)?;
        let conn = self.open_conn()?;

        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;

        let record = ActivityRecord {
            id: Uuid::new_v4(),
            document_id: *document_id,
            actor: actor.to_string(),
            kind,
            detail: detail.to_string(),
            recipient: recipient.map(String::from),
            created_at: Utc::now().naive_utc(),
        };
        repository::activity::append_activity(&conn, &record)?;
        Ok(record)
    }

    // ── Inbound operations: reads ───────────────────────────

    pub fn get_document(&self, document_id: &Uuid) -> Result<Document, EngineError> {
        let conn = self.open_conn()?;
        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))
    }

    /// The document's full trail, oldest first. The UI reverses for display.
    pub fn trail(&self, document_id: &Uuid) -> Result<Vec<ActivityRecord>, EngineError> {
        let conn = self.open_conn()?;
        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;
        Ok(repository::activity::trail_for_document(&conn, document_id)?)
    }

    /// Comments, newest first.
    pub fn comments(&self, document_id: &Uuid) -> Result<Vec<Comment>, EngineError> {
        let conn = self.open_conn()?;
        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;
        Ok(repository::comment::list_comments_for_document(&conn, document_id)?)
    }

    /// Referrals, newest first; the head is the current assignment.
    pub fn referrals(&self, document_id: &Uuid) -> Result<Vec<Referral>, EngineError> {
        let conn = self.open_conn()?;
        repository::document::get_document(&conn, document_id)?
            .ok_or_else(|| EngineError::not_found("document", document_id))?;
        Ok(repository::referral::list_referrals_for_document(&conn, document_id)?)
    }

    pub fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>, EngineError> {
        let conn = self.open_conn()?;
        Ok(repository::document::list_documents(&conn, filter)?)
    }

    pub fn search_documents(&self, query: &str) -> Result<Vec<Document>, EngineError> {
        let conn = self.open_conn()?;
        Ok(repository::document::search_documents(&conn, query)?)
    }

    /// Documents per status, for dashboard tiles.
    pub fn status_counts(&self) -> Result<Vec<(DocumentStatus, i64)>, EngineError> {
        let conn = self.open_conn()?;
        Ok(repository::document::count_by_status(&conn)?)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
