// User Directory Port

use crate::domain::{NewUser, User};
use crate::error::Result;
use async_trait::async_trait;

/// Lookup and registration of users by their front-end identifier
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Register a user, or return the existing record for the same external ID
    async fn register(&self, user: &NewUser) -> Result<User>;

    /// Find user by external (front-end) identifier
    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<User>>;

    /// Whether the user carries the staff flag. Unknown users are not staff.
    async fn is_staff(&self, external_id: i64) -> Result<bool> {
        Ok(self
            .find_by_external_id(external_id)
            .await?
            .map(|u| u.is_staff)
            .unwrap_or(false))
    }

    /// Set the staff flag. Returns false if the user does not exist.
    async fn promote(&self, external_id: i64) -> Result<bool>;

    /// All users, oldest registration first
    async fn list(&self) -> Result<Vec<User>>;
}
