//! RPC Method Handlers
//!
//! Resolves the calling user, enforces the staff flag, and forwards to the
//! queue service, the user directory or the service catalog.

use crate::error::to_rpc_error;
use crate::types::{
    ActorRequest, CancelRequest, EmptyRequest, EnqueueRequest, EnqueueResponse, MoveRequest,
    MutationResponse, PromoteRequest, PromoteResponse, QueueListResponse, RegisterRequest,
    ServiceChangeResponse, ServiceCreateRequest, ServiceCreateResponse, ServiceDeleteRequest,
    ServiceListResponse, ServiceUpdateRequest, SetStatusRequest, SlotsResponse,
    UserListResponse, VerifyResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use waitline_core::application::queue;
use waitline_core::application::QueueService;
use waitline_core::domain::slot;
use waitline_core::domain::{NewService, NewUser, User};
use waitline_core::error::AppError;
use waitline_core::port::{ServiceCatalog, TimeProvider, UserDirectory};

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    queue: Arc<QueueService>,
    directory: Arc<dyn UserDirectory>,
    catalog: Arc<dyn ServiceCatalog>,
    time_provider: Arc<dyn TimeProvider>,
    /// External ids granted the staff flag when they register
    staff_ids: HashSet<i64>,
}

impl RpcHandler {
    pub fn new(
        queue: Arc<QueueService>,
        directory: Arc<dyn UserDirectory>,
        catalog: Arc<dyn ServiceCatalog>,
        time_provider: Arc<dyn TimeProvider>,
        staff_ids: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            queue,
            directory,
            catalog,
            time_provider,
            staff_ids: staff_ids.into_iter().collect(),
        }
    }

    /// Registered user behind `actor`
    async fn require_user(&self, actor: i64) -> RpcResult<User> {
        self.directory
            .find_by_external_id(actor)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::NotFound(format!(
                    "User {} is not registered",
                    actor
                )))
            })
    }

    /// Registered user behind `actor`, who must carry the staff flag
    async fn require_staff(&self, actor: i64) -> RpcResult<User> {
        let user = self.require_user(actor).await?;
        if !user.is_staff {
            warn!(actor = actor, "Staff-only method called by non-staff user");
            return Err(to_rpc_error(AppError::Forbidden(
                "This method requires staff privileges".to_string(),
            )));
        }
        Ok(user)
    }

    /// user.register.v1
    pub async fn register(&self, params: RegisterRequest) -> RpcResult<User> {
        let mut user = self
            .directory
            .register(&NewUser {
                external_id: params.external_id,
                username: params.username,
                full_name: params.full_name,
            })
            .await
            .map_err(to_rpc_error)?;

        if !user.is_staff && self.staff_ids.contains(&user.external_id) {
            user.is_staff = self
                .directory
                .promote(user.external_id)
                .await
                .map_err(to_rpc_error)?;
            info!(external_id = user.external_id, "Bootstrap staff account promoted");
        }

        Ok(user)
    }

    /// user.list.v1
    pub async fn list_users(&self, params: ActorRequest) -> RpcResult<UserListResponse> {
        self.require_staff(params.actor).await?;
        let users = self.directory.list().await.map_err(to_rpc_error)?;
        Ok(UserListResponse { users })
    }

    /// user.promote.v1
    pub async fn promote(&self, params: PromoteRequest) -> RpcResult<PromoteResponse> {
        self.require_staff(params.actor).await?;
        let promoted = self
            .directory
            .promote(params.external_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(PromoteResponse {
            external_id: params.external_id,
            promoted,
        })
    }

    /// service.list.v1
    pub async fn list_services(&self, _params: EmptyRequest) -> RpcResult<ServiceListResponse> {
        let services = self.catalog.list().await.map_err(to_rpc_error)?;
        Ok(ServiceListResponse { services })
    }

    /// service.create.v1
    pub async fn create_service(
        &self,
        params: ServiceCreateRequest,
    ) -> RpcResult<ServiceCreateResponse> {
        self.require_staff(params.actor).await?;
        let service_id = self
            .catalog
            .create(&NewService {
                name: params.name,
                duration_minutes: params.duration_minutes,
                price_cents: params.price_cents,
            })
            .await
            .map_err(to_rpc_error)?;

        Ok(ServiceCreateResponse { service_id })
    }

    /// service.update.v1
    pub async fn update_service(
        &self,
        params: ServiceUpdateRequest,
    ) -> RpcResult<ServiceChangeResponse> {
        self.require_staff(params.actor).await?;
        let changed = self
            .catalog
            .update(
                params.service_id,
                &NewService {
                    name: params.name,
                    duration_minutes: params.duration_minutes,
                    price_cents: params.price_cents,
                },
            )
            .await
            .map_err(to_rpc_error)?;

        Ok(ServiceChangeResponse {
            service_id: params.service_id,
            changed,
        })
    }

    /// service.delete.v1
    pub async fn delete_service(
        &self,
        params: ServiceDeleteRequest,
    ) -> RpcResult<ServiceChangeResponse> {
        self.require_staff(params.actor).await?;
        let changed = self
            .catalog
            .delete(params.service_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(ServiceChangeResponse {
            service_id: params.service_id,
            changed,
        })
    }

    /// slots.list.v1
    pub async fn list_slots(&self, _params: EmptyRequest) -> RpcResult<SlotsResponse> {
        Ok(SlotsResponse {
            slots: slot::available_slots(self.time_provider.now_millis()),
        })
    }

    /// queue.enqueue.v1
    pub async fn enqueue(&self, params: EnqueueRequest) -> RpcResult<EnqueueResponse> {
        let user = self.require_user(params.actor).await?;
        if self
            .catalog
            .get(params.service_id)
            .await
            .map_err(to_rpc_error)?
            .is_none()
        {
            return Err(to_rpc_error(AppError::NotFound(format!(
                "Service {} not found",
                params.service_id
            ))));
        }

        let entry_id = self
            .queue
            .enqueue(queue::EnqueueRequest {
                user_id: user.id,
                service_id: params.service_id,
                scheduled_time: params.scheduled_time,
            })
            .await
            .map_err(to_rpc_error)?;

        // Read back after commit; a concurrent termination may already have
        // moved the entry forward.
        let entry = self
            .queue
            .find_entry(entry_id)
            .await
            .map_err(to_rpc_error)?
            .ok_or_else(|| {
                to_rpc_error(AppError::Internal(format!(
                    "Entry {} vanished after enqueue",
                    entry_id
                )))
            })?;

        Ok(EnqueueResponse {
            entry_id,
            status: entry.status,
            position: entry.position,
        })
    }

    /// queue.mine.v1
    pub async fn my_entries(&self, params: ActorRequest) -> RpcResult<QueueListResponse> {
        let user = self.require_user(params.actor).await?;
        let entries = self
            .queue
            .list_for_user(user.id)
            .await
            .map_err(to_rpc_error)?;
        Ok(QueueListResponse { entries })
    }

    /// queue.cancel.v1
    pub async fn cancel(&self, params: CancelRequest) -> RpcResult<MutationResponse> {
        let user = self.require_user(params.actor).await?;
        let outcome = self
            .queue
            .cancel_by_owner(params.entry_id, user.id)
            .await
            .map_err(to_rpc_error)?;
        Ok(MutationResponse::new(params.entry_id, outcome))
    }

    /// queue.board.v1
    pub async fn board(&self, params: ActorRequest) -> RpcResult<QueueListResponse> {
        self.require_staff(params.actor).await?;
        let entries = self.queue.list_all().await.map_err(to_rpc_error)?;
        Ok(QueueListResponse { entries })
    }

    /// queue.set_status.v1
    pub async fn set_status(&self, params: SetStatusRequest) -> RpcResult<MutationResponse> {
        self.require_staff(params.actor).await?;
        let outcome = self
            .queue
            .set_status(params.entry_id, params.status)
            .await
            .map_err(to_rpc_error)?;
        Ok(MutationResponse::new(params.entry_id, outcome))
    }

    /// queue.move.v1
    pub async fn move_entry(&self, params: MoveRequest) -> RpcResult<MutationResponse> {
        self.require_staff(params.actor).await?;
        let outcome = self
            .queue
            .move_entry(params.entry_id, params.direction)
            .await
            .map_err(to_rpc_error)?;
        Ok(MutationResponse::new(params.entry_id, outcome))
    }

    /// queue.verify.v1
    pub async fn verify(&self, params: ActorRequest) -> RpcResult<VerifyResponse> {
        self.require_staff(params.actor).await?;
        self.queue.verify_integrity().await.map_err(to_rpc_error)
    }
}
