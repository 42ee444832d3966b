// Cluster reachability monitor
use crate::domain::{ClusterStatus, NodeStatus, PortStatus, TfConfig};
use crate::error::Result;
use crate::port::{NetworkProbe, TimeProvider};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Probes ssh/ollama ports on every node's management and fabric addresses
pub struct ClusterMonitor {
    probe: Arc<dyn NetworkProbe>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ClusterMonitor {
    pub fn new(probe: Arc<dyn NetworkProbe>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            probe,
            time_provider,
        }
    }

    pub async fn status(&self, config: &TfConfig) -> Result<ClusterStatus> {
        let nodes = config.resolve_nodes()?;
        let fabric = config.fabric_addresses();
        let monitor = &config.settings.monitor;
        let timeout = config.settings.ssh.connect_timeout();

        let checks = nodes.into_iter().map(|node| {
            let fabric_ip = fabric.get(&node.name).cloned();
            async move {
                let mgmt = self
                    .ports(&node.mgmt_ip, monitor.ssh_port, monitor.ollama_port, timeout)
                    .await;
                let fabric = match &fabric_ip {
                    Some(ip) => {
                        self.ports(ip, monitor.ssh_port, monitor.ollama_port, timeout)
                            .await
                    }
                    None => PortStatus::default(),
                };
                debug!(node = %node.name, ?mgmt, ?fabric, "Node probed");

                NodeStatus {
                    name: node.name,
                    mgmt_ip: node.mgmt_ip,
                    fabric_ip,
                    mgmt,
                    fabric,
                }
            }
        });

        let nodes = join_all(checks).await;
        Ok(ClusterStatus {
            ts: self.time_provider.now_millis() as f64 / 1000.0,
            nodes,
        })
    }

    async fn ports(
        &self,
        host: &str,
        ssh_port: u16,
        ollama_port: u16,
        timeout: Duration,
    ) -> PortStatus {
        let (ssh, ollama) = futures::join!(
            self.probe.tcp_reachable(host, ssh_port, timeout),
            self.probe.tcp_reachable(host, ollama_port, timeout),
        );
        PortStatus { ssh, ollama }
    }
}
