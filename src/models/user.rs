use serde::{Deserialize, Serialize};

use super::enums::UserRole;

/// A directory user. Ids are assigned by the directory, not generated here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub department: String,
    pub role: UserRole,
    pub position: String,
}

/// A department alias that can receive referrals in place of a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
}
