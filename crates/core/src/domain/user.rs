// User Directory Model

use serde::{Deserialize, Serialize};

/// Internal user ID
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Identifier issued by the client-facing front-end
    pub external_id: i64,
    pub username: Option<String>,
    pub full_name: String,
    pub is_staff: bool,
    pub created_at: i64, // epoch ms
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub external_id: i64,
    pub username: Option<String>,
    pub full_name: String,
}
