use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A referral forwards a document to a user or department. Immutable once
/// created; the most recent referral determines who the document is
/// currently assigned to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub document_id: Uuid,
    pub referrer_id: String,
    pub recipient_id: String,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}
