//! RPC Request/Response Types
//!
//! Every request that acts on behalf of somebody carries `actor`, the caller's
//! external (front-end) identifier.

use serde::{Deserialize, Serialize};
use waitline_core::application::IntegrityReport;
use waitline_core::domain::{
    Direction, EntryId, EntryStatus, Outcome, Position, QueueItem, Rejection, Service,
    ServiceId, Termination, User,
};

/// user.register.v1
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub external_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub full_name: String,
}

/// Requests whose only parameter is the caller
/// (user.list.v1, queue.mine.v1, queue.board.v1, queue.verify.v1)
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

/// user.promote.v1
#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    pub actor: i64,
    pub external_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteResponse {
    pub external_id: i64,
    pub promoted: bool,
}

/// service.list.v1 and slots.list.v1 - No parameters needed
#[derive(Debug, Default, Deserialize)]
pub struct EmptyRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceListResponse {
    pub services: Vec<Service>,
}

/// service.create.v1
#[derive(Debug, Deserialize)]
pub struct ServiceCreateRequest {
    pub actor: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCreateResponse {
    pub service_id: ServiceId,
}

/// service.update.v1
#[derive(Debug, Deserialize)]
pub struct ServiceUpdateRequest {
    pub actor: i64,
    pub service_id: ServiceId,
    pub name: String,
    pub duration_minutes: i32,
    pub price_cents: i64,
}

/// service.delete.v1
#[derive(Debug, Deserialize)]
pub struct ServiceDeleteRequest {
    pub actor: i64,
    pub service_id: ServiceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceChangeResponse {
    pub service_id: ServiceId,
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    /// Slot start times, epoch ms
    pub slots: Vec<i64>,
}

/// queue.enqueue.v1
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub actor: i64,
    pub service_id: ServiceId,
    pub scheduled_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueResponse {
    pub entry_id: EntryId,
    pub status: EntryStatus,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueListResponse {
    pub entries: Vec<QueueItem>,
}

/// queue.cancel.v1
#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub actor: i64,
    pub entry_id: EntryId,
}

/// queue.set_status.v1
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub actor: i64,
    pub entry_id: EntryId,
    pub status: Termination,
}

/// queue.move.v1
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub actor: i64,
    pub entry_id: EntryId,
    pub direction: Direction,
}

/// Result of queue.cancel.v1, queue.set_status.v1 and queue.move.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub entry_id: EntryId,
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Rejection>,
}

impl MutationResponse {
    pub fn new(entry_id: EntryId, outcome: Outcome) -> Self {
        Self {
            entry_id,
            applied: outcome.is_applied(),
            reason: outcome.rejection(),
        }
    }
}

/// queue.verify.v1
pub type VerifyResponse = IntegrityReport;
