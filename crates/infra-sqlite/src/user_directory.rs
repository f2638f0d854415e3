// SQLite UserDirectory Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;
use waitline_core::domain::{NewUser, User};
use waitline_core::error::{AppError, Result};
use waitline_core::port::{TimeProvider, UserDirectory};

pub struct SqliteUserDirectory {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteUserDirectory {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn register(&self, user: &NewUser) -> Result<User> {
        let full_name = user.full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name cannot be empty".to_string()));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (external_id, username, full_name, is_staff, created_at)
            VALUES (?, ?, ?, 0, ?)
            ON CONFLICT(external_id) DO NOTHING
            "#,
        )
        .bind(user.external_id)
        .bind(&user.username)
        .bind(full_name)
        .bind(self.time_provider.now_millis())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if inserted.rows_affected() == 1 {
            info!(external_id = user.external_id, "User registered");
        }

        self.find_by_external_id(user.external_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "User {} missing right after registration",
                    user.external_id
                ))
            })
    }

    async fn find_by_external_id(&self, external_id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_user))
    }

    async fn promote(&self, external_id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET is_staff = 1 WHERE external_id = ?")
            .bind(external_id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let promoted = result.rows_affected() == 1;
        if promoted {
            info!(external_id = external_id, "User promoted to staff");
        }
        Ok(promoted)
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    external_id: i64,
    username: Option<String>,
    full_name: String,
    is_staff: bool,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            external_id: self.external_id,
            username: self.username,
            full_name: self.full_name,
            is_staff: self.is_staff,
            created_at: self.created_at,
        }
    }
}
