// Inventory loading (tf.yml + TF_ environment overrides)
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

use thunder_forge_core::domain::TfConfig;
use thunder_forge_core::AppError;

/// Expand `~` and `$VAR` in a user-supplied path
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

/// Load tf.yml; `TF_SECTION__KEY=value` overrides individual fields
///
/// # Errors
/// - AppError::Config if the file is missing, malformed, or fails validation
pub fn load_config(path: &Path) -> Result<TfConfig, AppError> {
    if !path.is_file() {
        return Err(AppError::Config(format!(
            "Missing config file: {}. Create tf.yml (or set TF_CONFIG_PATH).",
            path.display()
        )));
    }

    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(true))
        .add_source(
            Environment::with_prefix("TF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

    let config: TfConfig = settings
        .try_deserialize()
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

    // Surface inventory mistakes at load time rather than mid-command
    config.resolve_nodes()?;
    debug!(path = %path.display(), nodes = config.nodes.items.len(), "Loaded inventory");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const INVENTORY: &str = r#"
server:
  port: 9100
settings:
  ssh:
    connect_timeout_seconds: 2
nodes:
  defaults:
    ssh_user: admin
    service_manager: brew
  items:
    - name: msm1
      mgmt_ip: 192.168.1.101
    - name: msm2
      mgmt_ip: 192.168.1.102
      ssh_user: other
fabricnet:
  service_name: Thunderbolt Bridge
  ipv4_mode: dhcp_with_manual_address
  nodes:
    - name: msm1
      address: 172.16.10.1
"#;

    fn write(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tf.yml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    #[serial(tf_env)]
    fn test_load_inventory() {
        let (_dir, path) = write(INVENTORY);

        let config = load_config(&path).unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.settings.ssh.connect_timeout_seconds, 2.0);
        assert!(config.settings.ssh.batch_mode);
        let nodes = config.resolve_nodes().unwrap();
        assert_eq!(nodes[0].ssh_user, "admin");
        assert_eq!(nodes[1].ssh_user, "other");
        let fabric = config.fabricnet.unwrap();
        assert_eq!(
            fabric.ipv4_mode,
            thunder_forge_core::domain::Ipv4Mode::DhcpWithManualAddress
        );
    }

    #[test]
    #[serial(tf_env)]
    fn test_null_items_read_as_empty() {
        let (_dir, path) = write("nodes:\n  items:\n");

        let config = load_config(&path).unwrap();

        assert!(config.nodes.items.is_empty());
        assert!(config.fabricnet.is_none());
    }

    #[test]
    #[serial(tf_env)]
    fn test_missing_file_guidance() {
        let err = load_config(Path::new("/nonexistent/tf.yml")).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Configuration error: Missing config file: /nonexistent/tf.yml. Create tf.yml (or set TF_CONFIG_PATH)."
        );
    }

    #[test]
    #[serial(tf_env)]
    fn test_missing_ssh_user_rejected() {
        let (_dir, path) = write("nodes:\n  items:\n    - name: a\n      mgmt_ip: 10.0.0.1\n      service_manager: brew\n");

        assert!(matches!(load_config(&path), Err(AppError::Domain(_))));
    }

    #[test]
    #[serial(tf_env)]
    fn test_environment_overrides_file() {
        let (_dir, path) = write(INVENTORY);
        std::env::set_var("TF_SERVER__PORT", "9123");
        std::env::set_var("TF_SETTINGS__SSH__BATCH_MODE", "false");

        let loaded = load_config(&path);
        std::env::remove_var("TF_SERVER__PORT");
        std::env::remove_var("TF_SETTINGS__SSH__BATCH_MODE");

        let config = loaded.unwrap();
        assert_eq!(config.server.port, 9123);
        assert!(!config.settings.ssh.batch_mode);
        assert_eq!(config.settings.ssh.connect_timeout_seconds, 2.0);
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_path("~/tf.yml");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert_eq!(expand_path("tf.yml"), PathBuf::from("tf.yml"));
    }
}
