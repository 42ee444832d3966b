// Cluster reachability snapshot

use serde::{Deserialize, Serialize};

/// Reachability of the well-known service ports on one address
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStatus {
    pub ssh: bool,
    pub ollama: bool,
}

impl PortStatus {
    pub fn is_up(&self) -> bool {
        self.ssh && self.ollama
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub name: String,
    pub mgmt_ip: String,
    pub fabric_ip: Option<String>,
    pub mgmt: PortStatus,
    pub fabric: PortStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatus {
    /// Unix timestamp (seconds) of the snapshot
    pub ts: f64,
    pub nodes: Vec<NodeStatus>,
}
