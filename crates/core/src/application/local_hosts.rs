// Local hosts sync (hub /etc/hosts)
use crate::domain::{build_hosts_block, upsert_managed_block, TfConfig};
use crate::error::Result;
use crate::port::HostsStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Result of a local hosts sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHostsReport {
    pub artifact: PathBuf,
    /// Entries between the markers
    pub entries: usize,
    /// false when the hosts file already contained the same block
    pub hosts_updated: bool,
}

pub struct LocalHostsService {
    store: Arc<dyn HostsStore>,
}

impl LocalHostsService {
    pub fn new(store: Arc<dyn HostsStore>) -> Self {
        Self { store }
    }

    /// Write the managed block artifact, then upsert it into the hosts file
    pub async fn apply(&self, config: &TfConfig, artifact: &Path) -> Result<LocalHostsReport> {
        let block = build_hosts_block(config)?;

        if let Some(parent) = artifact.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(artifact, block.as_str()).await?;
        info!(path = %artifact.display(), "Wrote managed hosts block");

        let current = self.store.read().await?;
        let updated = upsert_managed_block(&current, &block, &config.settings.hosts_sync);
        let hosts_updated = updated != current;
        if hosts_updated {
            self.store.write(&updated).await?;
            info!("Updated local hosts file");
        } else {
            info!("Local hosts file already up to date");
        }

        Ok(LocalHostsReport {
            artifact: artifact.to_path_buf(),
            entries: block.as_str().lines().count().saturating_sub(2),
            hosts_updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::hosts_store::mocks::InMemoryHostsStore;

    fn inventory() -> TfConfig {
        serde_json::from_value(serde_json::json!({
            "nodes": {
                "defaults": {"ssh_user": "u", "service_manager": "brew"},
                "items": [{"name": "msm1", "mgmt_ip": "192.168.1.101"}]
            },
            "fabricnet": {"nodes": [{"name": "msm1", "address": "172.16.10.1"}]}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_apply_writes_artifact_and_hosts() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("artifacts").join("hosts.block");
        let store = Arc::new(InMemoryHostsStore::new("127.0.0.1 localhost\n"));
        let service = LocalHostsService::new(store.clone());

        let report = service.apply(&inventory(), &artifact).await.unwrap();

        assert_eq!(report.entries, 2);
        assert!(report.hosts_updated);
        let block = std::fs::read_to_string(&artifact).unwrap();
        assert_eq!(
            block,
            "# BEGIN thunder-forge\n192.168.1.101 msm1-mgmt\n172.16.10.1 msm1-fabric\n# END thunder-forge\n"
        );
        assert_eq!(store.content(), format!("127.0.0.1 localhost\n\n{}", block));
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_hosts_file_not_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("hosts.block");
        let current = "127.0.0.1 localhost\n# BEGIN thunder-forge\n192.168.1.101 msm1-mgmt\n172.16.10.1 msm1-fabric\n# END thunder-forge\n";
        let store = Arc::new(InMemoryHostsStore::new(current));

        let report = LocalHostsService::new(store.clone())
            .apply(&inventory(), &artifact)
            .await
            .unwrap();

        assert!(!report.hosts_updated);
        assert_eq!(store.writes(), 0);
        assert_eq!(store.content(), current);
    }
}
