// Network Probe Port
// TCP reachability checks for monitoring and post-setup verification

use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// true if a TCP connection to `host:port` (IPv4) opens within `timeout`
    ///
    /// Never errors: unresolvable hosts, refusals and timeouts all read as unreachable.
    async fn tcp_reachable(&self, host: &str, port: u16, timeout: Duration) -> bool;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock probe: only the listed endpoints answer
    #[derive(Default)]
    pub struct MockNetworkProbe {
        reachable: HashSet<(String, u16)>,
        probes: Mutex<Vec<(String, u16, Duration)>>,
    }
    impl MockNetworkProbe {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn with_reachable(mut self, host: &str, port: u16) -> Self {
            self.reachable.insert((host.to_string(), port));
            self
        }
        pub fn probes(&self) -> Vec<(String, u16, Duration)> {
            self.probes.lock().unwrap().clone()
        }
    }
    #[async_trait]
    impl NetworkProbe for MockNetworkProbe {
        async fn tcp_reachable(&self, host: &str, port: u16, timeout: Duration) -> bool {
            self.probes
                .lock()
                .unwrap()
                .push((host.to_string(), port, timeout));
            self.reachable.contains(&(host.to_string(), port))
        }
    }
}
