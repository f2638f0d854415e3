// Queue Service - the Queue Entry Store's public operations

pub mod allocator;
pub mod enqueue;
pub mod integrity;
pub mod reorder;
pub mod swap;
pub mod terminate;


pub use enqueue::EnqueueRequest;
pub use integrity::IntegrityReport;

use crate::domain::{
    Direction, EntryId, EntryStatus, Outcome, QueueEntry, QueueItem, Termination, UserId,
};
use crate::error::{AppError, Result};
use crate::port::{QueueRepository, QueueTransaction, TimeProvider, TransactionalQueueRepository};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Queue Service
///
/// Every mutation runs in exactly one store transaction. Applied outcomes are
/// committed; rejected outcomes roll back; errors drop the transaction, which
/// rolls it back.
pub struct QueueService {
    tx_queue_repo: Arc<dyn TransactionalQueueRepository>,
    queue_repo: Arc<dyn QueueRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl QueueService {
    pub fn new(
        tx_queue_repo: Arc<dyn TransactionalQueueRepository>,
        queue_repo: Arc<dyn QueueRepository>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            tx_queue_repo,
            queue_repo,
            time_provider,
        }
    }

    /// Append a new waiting entry at the end of the queue
    pub async fn enqueue(&self, req: EnqueueRequest) -> Result<EntryId> {
        enqueue::execute(
            self.tx_queue_repo.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Look up a single entry regardless of status
    pub async fn find_entry(&self, entry_id: EntryId) -> Result<Option<QueueEntry>> {
        self.queue_repo.find_by_id(entry_id).await
    }

    /// A user's waiting entries, first in line first
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<QueueItem>> {
        self.queue_repo.list_waiting_for_user(user_id).await
    }

    /// The whole waiting queue with client and service display data
    pub async fn list_all(&self) -> Result<Vec<QueueItem>> {
        self.queue_repo.list_waiting().await
    }

    /// Complete or cancel an entry (staff action)
    pub async fn set_status(&self, entry_id: EntryId, termination: Termination) -> Result<Outcome> {
        let mut tx = self.tx_queue_repo.begin_transaction().await?;
        let outcome =
            terminate::terminate_within(tx.as_mut(), entry_id, termination, None).await?;
        finish(tx, outcome).await?;

        log_outcome(entry_id, "set_status", outcome);
        Ok(outcome)
    }

    /// Cancel an entry on behalf of its owner
    pub async fn cancel_by_owner(&self, entry_id: EntryId, user_id: UserId) -> Result<Outcome> {
        let mut tx = self.tx_queue_repo.begin_transaction().await?;
        let outcome = terminate::terminate_within(
            tx.as_mut(),
            entry_id,
            Termination::Cancelled,
            Some(user_id),
        )
        .await?;
        finish(tx, outcome).await?;

        log_outcome(entry_id, "cancel_by_owner", outcome);
        Ok(outcome)
    }

    /// Move a waiting entry one rank up or down
    pub async fn move_entry(&self, entry_id: EntryId, direction: Direction) -> Result<Outcome> {
        let mut tx = self.tx_queue_repo.begin_transaction().await?;
        let outcome = swap::move_within(tx.as_mut(), entry_id, direction).await?;
        finish(tx, outcome).await?;

        log_outcome(entry_id, "move", outcome);
        Ok(outcome)
    }

    /// Check the {1..N} invariant without repairing anything
    pub async fn verify_integrity(&self) -> Result<IntegrityReport> {
        let positions = self.queue_repo.waiting_positions().await?;
        if let Err(fault) = integrity::check_contiguous(&positions) {
            error!(error = %fault, "Queue integrity fault detected, operator intervention required");
            return Err(AppError::Domain(fault));
        }

        Ok(IntegrityReport {
            waiting: positions.len() as i64,
            completed: self
                .queue_repo
                .count_by_status(EntryStatus::Completed)
                .await?,
            cancelled: self
                .queue_repo
                .count_by_status(EntryStatus::Cancelled)
                .await?,
        })
    }
}

/// Commit applied outcomes, roll back rejected ones
async fn finish(tx: Box<dyn QueueTransaction>, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Applied => tx.commit().await,
        Outcome::Rejected(_) => tx.rollback().await,
    }
}

fn log_outcome(entry_id: EntryId, operation: &str, outcome: Outcome) {
    match outcome {
        Outcome::Applied => info!(entry_id = entry_id, operation = operation, "Queue updated"),
        Outcome::Rejected(reason) => debug!(
            entry_id = entry_id,
            operation = operation,
            reason = %reason,
            "Queue mutation rejected"
        ),
    }
}
