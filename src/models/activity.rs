use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ActivityKind;

/// Actor recorded on an activity entry: the string "system" or a user id.
pub const SYSTEM_ACTOR: &str = "system";

/// One entry in a document's activity trail. Append-only: the trail is the
/// canonical history of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub document_id: Uuid,
    pub actor: String,
    pub kind: ActivityKind,
    pub detail: String,
    pub recipient: Option<String>,
    pub created_at: NaiveDateTime,
}
