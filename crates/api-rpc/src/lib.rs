//! JSON-RPC API Layer
//!
//! Read-only status server: `health.v1` and `cluster.status.v1` over HTTP.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use jsonrpsee::server::ServerHandle;
pub use server::{RpcServer, RpcServerConfig};
