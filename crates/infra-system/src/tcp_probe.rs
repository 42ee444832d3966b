// TCP reachability probe
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;
use tracing::trace;

use thunder_forge_core::port::NetworkProbe;

/// Opens (and immediately drops) an IPv4 TCP connection
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProbe;

impl TcpProbe {
    pub fn new() -> Self {
        Self
    }

    async fn connect(host: &str, port: u16) -> std::io::Result<()> {
        let addr = lookup_host((host, port))
            .await?
            .find(|a| a.is_ipv4())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no IPv4 address")
            })?;
        TcpStream::connect(addr).await.map(drop)
    }
}

#[async_trait]
impl NetworkProbe for TcpProbe {
    async fn tcp_reachable(&self, host: &str, port: u16, limit: Duration) -> bool {
        let result = timeout(limit, Self::connect(host, port)).await;
        trace!(host, port, ?result, "TCP probe");
        matches!(result, Ok(Ok(())))
    }
}
