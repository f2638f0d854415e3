//! JSON-RPC API Layer
//!
//! Exposes the waiting queue, the user directory and the service catalog as
//! versioned JSON-RPC 2.0 methods.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
