//! JSON-RPC Server
//!
//! JSON-RPC 2.0 over HTTP on `BIND:PORT`.

use crate::handler::RpcHandler;
use crate::types::method;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use thunder_forge_core::application::constants::{DEFAULT_BIND, DEFAULT_PORT};
use thunder_forge_core::application::ClusterMonitor;
use thunder_forge_core::domain::TfConfig;
use tracing::info;

/// RPC Server Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, inventory: Arc<TfConfig>, monitor: ClusterMonitor) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(inventory, monitor)),
        }
    }

    /// Bind and start serving; port 0 picks a free port (see the returned address)
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to bind {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        let handler = self.handler.clone();
        module
            .register_async_method(method::HEALTH, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.health().await }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method(method::CLUSTER_STATUS, move |_, _, _| {
                let handler = handler.clone();
                async move { handler.cluster_status().await }
            })
            .map_err(|e| e.to_string())?;

        info!(addr = %local_addr, "JSON-RPC status server listening");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
