//! RPC Request/Response Types

use serde::{Deserialize, Serialize};

/// Method names (versioned)
pub mod method {
    pub const HEALTH: &str = "health.v1";
    pub const CLUSTER_STATUS: &str = "cluster.status.v1";
}

/// health.v1 - Liveness of the status server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// cluster.status.v1 returns thunder_forge_core::domain::ClusterStatus as-is
