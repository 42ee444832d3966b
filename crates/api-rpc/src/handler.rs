//! RPC Method Handlers

use crate::error::to_rpc_error;
use crate::types::HealthResponse;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Instant;
use thunder_forge_core::application::ClusterMonitor;
use thunder_forge_core::domain::{ClusterStatus, TfConfig};
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    inventory: Arc<TfConfig>,
    monitor: ClusterMonitor,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(inventory: Arc<TfConfig>, monitor: ClusterMonitor) -> Self {
        Self {
            inventory,
            monitor,
            start_time: Instant::now(),
        }
    }

    /// health.v1
    pub async fn health(&self) -> Result<HealthResponse, ErrorObjectOwned> {
        Ok(HealthResponse {
            status: "ok".to_string(),
            version: thunder_forge_core::VERSION.to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }

    /// cluster.status.v1
    pub async fn cluster_status(&self) -> Result<ClusterStatus, ErrorObjectOwned> {
        let status = self
            .monitor
            .status(&self.inventory)
            .await
            .map_err(to_rpc_error)?;
        debug!(nodes = status.nodes.len(), "Cluster status served");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thunder_forge_core::port::network_probe::mocks::MockNetworkProbe;
    use thunder_forge_core::port::time_provider::FixedTimeProvider;

    fn handler(inventory: serde_json::Value) -> RpcHandler {
        let monitor = ClusterMonitor::new(
            Arc::new(MockNetworkProbe::new().with_reachable("10.0.0.1", 22)),
            Arc::new(FixedTimeProvider(2_000)),
        );
        RpcHandler::new(
            Arc::new(serde_json::from_value(inventory).unwrap()),
            monitor,
        )
    }

    #[tokio::test]
    async fn test_health() {
        let h = handler(serde_json::json!({"nodes": {"items": []}}));

        let health = h.health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert_eq!(health.version, thunder_forge_core::VERSION);
    }

    #[tokio::test]
    async fn test_cluster_status() {
        let h = handler(serde_json::json!({
            "nodes": {
                "defaults": {"ssh_user": "u", "service_manager": "brew"},
                "items": [{"name": "node1", "mgmt_ip": "10.0.0.1"}]
            }
        }));

        let status = h.cluster_status().await.unwrap();

        assert_eq!(status.ts, 2.0);
        assert_eq!(status.nodes[0].name, "node1");
        assert!(status.nodes[0].mgmt.ssh);
        assert!(!status.nodes[0].mgmt.ollama);
    }

    #[tokio::test]
    async fn test_invalid_inventory_maps_to_validation_error() {
        let h = handler(serde_json::json!({
            "nodes": {"items": [{"name": "node1", "mgmt_ip": "10.0.0.1"}]}
        }));

        let err = h.cluster_status().await.unwrap_err();

        assert_eq!(err.code(), crate::error::code::VALIDATION_ERROR);
    }
}
