use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub document_id: Uuid,
    pub author_id: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}
