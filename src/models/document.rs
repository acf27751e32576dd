use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentStatus;

/// Document types offered by the upload form.
pub const DOCUMENT_TYPES: &[&str] = &[
    "Policy Document",
    "Budget Proposal",
    "Legal Agreement",
    "Internal Memo",
    "Report",
    "Meeting Minutes",
    "Project Plan",
    "Other",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub doc_type: String,
    pub owner_id: String,
    pub status: DocumentStatus,
    pub department: String,
    pub created_at: NaiveDateTime,
}

/// Metadata for a new document. Status and timestamps are engine-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub title: String,
    pub description: Option<String>,
    pub doc_type: String,
    pub department: String,
}
