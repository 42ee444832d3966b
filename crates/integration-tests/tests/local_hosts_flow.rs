//! tf.yml -> managed block artifact -> hosts file, through the real adapters

use std::sync::Arc;

use thunder_forge_core::application::LocalHostsService;
use thunder_forge_infra_system::{load_config, SystemHostsFile};

const INVENTORY: &str = r##"
settings:
  hosts_sync:
    managed_block_start: "# BEGIN tf-test"
    managed_block_end: "# END tf-test"
nodes:
  defaults:
    ssh_user: admin
    service_manager: brew
  items:
    - name: msm1
      mgmt_ip: 192.168.1.101
    - name: msm2
      mgmt_ip: 192.168.1.102
fabricnet:
  nodes:
    - name: msm1
      address: 172.16.10.1
telegram:
  bot_token: ignored
"##;

#[tokio::test]
async fn test_local_hosts_replaces_stale_block() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("tf.yml");
    std::fs::write(&config_path, INVENTORY).unwrap();
    let hosts_path = dir.path().join("hosts");
    std::fs::write(
        &hosts_path,
        "127.0.0.1 localhost\n\n# BEGIN tf-test\n10.9.9.9 stale-mgmt\n# END tf-test\n\n::1 localhost\n",
    )
    .unwrap();
    let artifact = dir.path().join("artifacts").join("hosts.block");

    let config = load_config(&config_path).unwrap();
    let service = LocalHostsService::new(Arc::new(SystemHostsFile::new(&hosts_path).without_sudo()));

    let report = service.apply(&config, &artifact).await.unwrap();
    assert!(report.hosts_updated);
    assert_eq!(report.entries, 3);

    let block = "# BEGIN tf-test\n192.168.1.101 msm1-mgmt\n172.16.10.1 msm1-fabric\n192.168.1.102 msm2-mgmt\n# END tf-test\n";
    assert_eq!(std::fs::read_to_string(&artifact).unwrap(), block);
    assert_eq!(
        std::fs::read_to_string(&hosts_path).unwrap(),
        format!("127.0.0.1 localhost\n{}::1 localhost\n", block)
    );

    // Second run: nothing to change
    let again = service.apply(&config, &artifact).await.unwrap();
    assert!(!again.hosts_updated);
}
