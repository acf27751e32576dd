use super::enums::DocumentStatus;

#[derive(Debug, Default, Clone)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub owner_id: Option<String>,
    pub department: Option<String>,
    pub limit: Option<u32>,
}
