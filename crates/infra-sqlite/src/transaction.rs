// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::queue_repository::QueueEntryRow;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use tracing::trace;
use waitline_core::domain::{
    EntryId, EntryStatus, NewQueueEntry, Position, PositionAssignment, QueueEntry,
};
use waitline_core::error::Result;
use waitline_core::port::{QueueTransaction, Transaction};

/// Write transaction on the queue table.
///
/// Opened with `BEGIN IMMEDIATE`, so the write lock is held from the first
/// statement until commit or rollback.
pub struct SqliteQueueTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteQueueTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteQueueTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl QueueTransaction for SqliteQueueTransaction {
    async fn max_waiting_position(&mut self) -> Result<Option<Position>> {
        sqlx::query_scalar("SELECT MAX(position) FROM queue_entries WHERE status = ?")
            .bind(EntryStatus::Waiting.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert(&mut self, entry: &NewQueueEntry) -> Result<EntryId> {
        let result = sqlx::query(
            r#"
            INSERT INTO queue_entries (
                user_id, service_id, scheduled_time, status, position, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.service_id)
        .bind(entry.scheduled_time)
        .bind(EntryStatus::Waiting.as_str())
        .bind(entry.position)
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_id(&mut self, id: EntryId) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, QueueEntryRow>("SELECT * FROM queue_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        row.map(QueueEntryRow::into_entry).transpose()
    }

    async fn find_waiting_at(&mut self, position: Position) -> Result<Option<EntryId>> {
        sqlx::query_scalar("SELECT id FROM queue_entries WHERE status = ? AND position = ?")
            .bind(EntryStatus::Waiting.as_str())
            .bind(position)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_status(
        &mut self,
        id: EntryId,
        from: EntryStatus,
        to: EntryStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE queue_entries SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn waiting_positions(&mut self) -> Result<Vec<(EntryId, Position)>> {
        sqlx::query_as(
            "SELECT id, position FROM queue_entries WHERE status = ? ORDER BY position ASC, id ASC",
        )
        .bind(EntryStatus::Waiting.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)
    }

    async fn assign_positions(&mut self, assignments: &[PositionAssignment]) -> Result<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        // Park every target at its negation first so the unique index on
        // waiting positions never sees two rows sharing a value mid-update.
        for a in assignments {
            sqlx::query("UPDATE queue_entries SET position = ? WHERE id = ? AND status = ?")
                .bind(-a.position)
                .bind(a.entry_id)
                .bind(EntryStatus::Waiting.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        let flipped = sqlx::query(
            "UPDATE queue_entries SET position = -position WHERE status = ? AND position < 0",
        )
        .bind(EntryStatus::Waiting.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        trace!(
            assigned = assignments.len(),
            flipped = flipped.rows_affected(),
            "Positions written"
        );
        Ok(())
    }
}
