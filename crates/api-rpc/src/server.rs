//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP on a localhost TCP port.

use crate::handler::RpcHandler;
use crate::types::{
    ActorRequest, CancelRequest, EmptyRequest, EnqueueRequest, MoveRequest, PromoteRequest,
    RegisterRequest, ServiceCreateRequest, ServiceDeleteRequest, ServiceUpdateRequest,
    SetStatusRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Register one async method that parses `$req` and calls `RpcHandler::$func`
macro_rules! register {
    ($module:expr, $handler:expr, $method:literal, $req:ty, $func:ident) => {{
        let handler = Arc::clone(&$handler);
        $module
            .register_async_method($method, move |params, _, _| {
                let handler = Arc::clone(&handler);
                async move {
                    let req: $req = params.parse()?;
                    handler.$func(req).await
                }
            })
            .map_err(|e| e.to_string())?;
    }};
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: RpcHandler) -> Self {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }

    /// Build the method table
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut module = RpcModule::new(());
        let h = &self.handler;

        // Users
        register!(module, h, "user.register.v1", RegisterRequest, register);
        register!(module, h, "user.list.v1", ActorRequest, list_users);
        register!(module, h, "user.promote.v1", PromoteRequest, promote);

        // Service catalog
        register!(module, h, "service.list.v1", EmptyRequest, list_services);
        register!(module, h, "service.create.v1", ServiceCreateRequest, create_service);
        register!(module, h, "service.update.v1", ServiceUpdateRequest, update_service);
        register!(module, h, "service.delete.v1", ServiceDeleteRequest, delete_service);
        register!(module, h, "slots.list.v1", EmptyRequest, list_slots);

        // Queue (client)
        register!(module, h, "queue.enqueue.v1", EnqueueRequest, enqueue);
        register!(module, h, "queue.mine.v1", ActorRequest, my_entries);
        register!(module, h, "queue.cancel.v1", CancelRequest, cancel);

        // Queue (staff)
        register!(module, h, "queue.board.v1", ActorRequest, board);
        register!(module, h, "queue.set_status.v1", SetStatusRequest, set_status);
        register!(module, h, "queue.move.v1", MoveRequest, move_entry);
        register!(module, h, "queue.verify.v1", ActorRequest, verify);

        Ok(module)
    }

    /// Start the JSON-RPC server
    ///
    /// Returns the bound address (useful with port 0) and the handle that
    /// keeps the server alive.
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server on TCP"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        let handle = server.start(module);

        info!(addr = %local_addr, "JSON-RPC server started successfully");
        Ok((local_addr, handle))
    }
}
