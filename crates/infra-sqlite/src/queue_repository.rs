// SQLite QueueRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteQueueTransaction;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;
use waitline_core::domain::{
    ClientInfo, EntryId, EntryStatus, Position, QueueEntry, QueueItem, UserId,
};
use waitline_core::error::Result;
use waitline_core::port::{
    QueueRepository, QueueTransaction, TransactionalQueueRepository,
};

const ITEM_COLUMNS: &str = r#"
    q.id, q.user_id, q.service_id, q.scheduled_time, q.status, q.position, q.created_at,
    s.name AS service_name, s.duration_minutes, s.price_cents,
    u.full_name, u.username
"#;

#[derive(Clone)]
pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn find_by_id(&self, id: EntryId) -> Result<Option<QueueEntry>> {
        let row = sqlx::query_as::<_, QueueEntryRow>("SELECT * FROM queue_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(QueueEntryRow::into_entry).transpose()
    }

    async fn list_waiting_for_user(&self, user_id: UserId) -> Result<Vec<QueueItem>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM queue_entries q
            JOIN services s ON s.id = q.service_id
            JOIN users u ON u.id = q.user_id
            WHERE q.status = ? AND q.user_id = ?
            ORDER BY q.position ASC
            "#
        );
        let rows: Vec<QueueItemRow> = sqlx::query_as(&sql)
            .bind(EntryStatus::Waiting.as_str())
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_item(false)).collect()
    }

    async fn list_waiting(&self) -> Result<Vec<QueueItem>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM queue_entries q
            JOIN services s ON s.id = q.service_id
            JOIN users u ON u.id = q.user_id
            WHERE q.status = ?
            ORDER BY q.position ASC
            "#
        );
        let rows: Vec<QueueItemRow> = sqlx::query_as(&sql)
            .bind(EntryStatus::Waiting.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(|r| r.into_item(true)).collect()
    }

    async fn waiting_positions(&self) -> Result<Vec<Position>> {
        sqlx::query_scalar("SELECT position FROM queue_entries WHERE status = ? ORDER BY position")
            .bind(EntryStatus::Waiting.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_by_status(&self, status: EntryStatus) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE status = ?")
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl TransactionalQueueRepository for SqliteQueueRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
        // IMMEDIATE takes the write lock up front; a deferred BEGIN would let
        // two writers read the same max position before either inserts.
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(map_sqlx_error)?;
        debug!("Queue write transaction started");
        Ok(Box::new(SqliteQueueTransaction::new(tx)))
    }
}

// Row mapping helper
#[derive(sqlx::FromRow)]
pub(crate) struct QueueEntryRow {
    id: i64,
    user_id: i64,
    service_id: i64,
    scheduled_time: i64,
    status: String,
    position: i64,
    created_at: i64,
}

impl QueueEntryRow {
    pub(crate) fn into_entry(self) -> Result<QueueEntry> {
        Ok(QueueEntry {
            id: self.id,
            user_id: self.user_id,
            service_id: self.service_id,
            scheduled_time: self.scheduled_time,
            status: self.status.parse()?,
            position: self.position,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct QueueItemRow {
    #[sqlx(flatten)]
    entry: QueueEntryRow,
    service_name: String,
    duration_minutes: i32,
    price_cents: i64,
    full_name: String,
    username: Option<String>,
}

impl QueueItemRow {
    fn into_item(self, with_client: bool) -> Result<QueueItem> {
        let client = with_client.then(|| ClientInfo {
            full_name: self.full_name,
            username: self.username,
        });
        Ok(QueueItem {
            entry: self.entry.into_entry()?,
            service_name: self.service_name,
            duration_minutes: self.duration_minutes,
            price_cents: self.price_cents,
            client,
        })
    }
}
