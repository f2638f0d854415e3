// Transaction port for atomic queue mutations

use crate::domain::{
    EntryId, EntryStatus, NewQueueEntry, Position, PositionAssignment, QueueEntry,
};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Opens queue transactions
#[async_trait]
pub trait TransactionalQueueRepository: Send + Sync {
    /// Begin a new write transaction.
    ///
    /// Implementations must acquire write exclusion before the first read, so
    /// that a read-then-write inside the transaction cannot interleave with
    /// another writer (e.g. two enqueues computing the same next position).
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>>;
}

/// Queue operations within a transaction
#[async_trait]
pub trait QueueTransaction: Transaction {
    /// Highest position among waiting entries, `None` if nobody is waiting
    async fn max_waiting_position(&mut self) -> Result<Option<Position>>;

    /// Insert a new waiting entry and return its store-assigned ID
    async fn insert(&mut self, entry: &NewQueueEntry) -> Result<EntryId>;

    /// Find entry by ID regardless of status
    async fn find_by_id(&mut self, id: EntryId) -> Result<Option<QueueEntry>>;

    /// ID of the waiting entry holding `position`
    async fn find_waiting_at(&mut self, position: Position) -> Result<Option<EntryId>>;

    /// Conditional status update (`WHERE status = from`).
    ///
    /// Returns whether a row was changed.
    async fn update_status(&mut self, id: EntryId, from: EntryStatus, to: EntryStatus)
        -> Result<bool>;

    /// All waiting entries as (id, position), ordered by position ascending
    async fn waiting_positions(&mut self) -> Result<Vec<(EntryId, Position)>>;

    /// Write new positions for waiting entries.
    ///
    /// The final state must hold unique positions; intermediate states inside
    /// the call are not observable.
    async fn assign_positions(&mut self, assignments: &[PositionAssignment]) -> Result<()>;
}
