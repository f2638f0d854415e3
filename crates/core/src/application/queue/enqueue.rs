// Enqueue Use Case

use crate::application::queue::allocator;
use crate::domain::{EntryId, NewQueueEntry, ServiceId, UserId};
use crate::error::{AppError, Result};
use crate::port::{TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Enqueue request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub user_id: UserId,
    pub service_id: ServiceId,
    pub scheduled_time: i64, // epoch ms
}

/// Reject requests that can never reference valid rows
pub fn validate_request(req: &EnqueueRequest) -> Result<()> {
    if req.user_id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid user id: {}",
            req.user_id
        )));
    }
    if req.service_id <= 0 {
        return Err(AppError::Validation(format!(
            "Invalid service id: {}",
            req.service_id
        )));
    }
    if req.scheduled_time < 0 {
        return Err(AppError::Validation(
            "Scheduled time is out of range".to_string(),
        ));
    }
    Ok(())
}

/// Execute enqueue use case (one transaction: allocate + insert)
///
/// # Arguments
///
/// * `queue_repo` - Transactional queue repository
/// * `time_provider` - Time provider (injected for determinism)
/// * `req` - Enqueue request
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
    req: EnqueueRequest,
) -> Result<EntryId> {
    validate_request(&req)?;

    let mut tx = queue_repo.begin_transaction().await?;

    let position = allocator::allocate_next_position(tx.as_mut()).await?;

    let entry = NewQueueEntry {
        user_id: req.user_id,
        service_id: req.service_id,
        scheduled_time: req.scheduled_time,
        position,
        created_at: time_provider.now_millis(),
    };
    let entry_id = tx.insert(&entry).await?;

    tx.commit().await?;

    info!(
        entry_id = entry_id,
        user_id = req.user_id,
        service_id = req.service_id,
        position = position,
        "Entry enqueued"
    );
    Ok(entry_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_id: UserId, service_id: ServiceId) -> EnqueueRequest {
        EnqueueRequest {
            user_id,
            service_id,
            scheduled_time: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_validate_valid_request() {
        assert!(validate_request(&request(1, 1)).is_ok());
    }

    #[test]
    fn test_validate_user_id() {
        let err = validate_request(&request(0, 1)).unwrap_err();
        assert!(err.to_string().contains("user id"));
    }

    #[test]
    fn test_validate_service_id() {
        let err = validate_request(&request(1, -3)).unwrap_err();
        assert!(err.to_string().contains("service id"));
    }

    #[test]
    fn test_validate_scheduled_time() {
        let mut req = request(1, 1);
        req.scheduled_time = -1;
        assert!(validate_request(&req).is_err());
    }
}
