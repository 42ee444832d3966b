// Inventory Domain Model (tf.yml)

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::error::{DomainError, Result};
use super::fabric::Ipv4Mode;

/// `nodes:` or `items:` holding only comments parses as null; treat it as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Status server binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_connect_timeout() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: f64,
    #[serde(default = "default_true")]
    pub batch_mode: bool,
}

impl SshSettings {
    /// Connect timeout as a Duration; negative or NaN is zero, overflow saturates
    pub fn connect_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.connect_timeout_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: default_connect_timeout(),
            batch_mode: true,
        }
    }
}

fn default_ssh_port() -> u16 {
    22
}

fn default_ollama_port() -> u16 {
    11434
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorSettings {
    #[serde(default = "default_ssh_port")]
    pub ssh_port: u16,
    #[serde(default = "default_ollama_port")]
    pub ollama_port: u16,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            ssh_port: default_ssh_port(),
            ollama_port: default_ollama_port(),
        }
    }
}

fn default_block_start() -> String {
    "# BEGIN thunder-forge".to_string()
}

fn default_block_end() -> String {
    "# END thunder-forge".to_string()
}

/// Markers delimiting the managed span of /etc/hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostsSyncSettings {
    #[serde(default = "default_block_start")]
    pub managed_block_start: String,
    #[serde(default = "default_block_end")]
    pub managed_block_end: String,
}

impl Default for HostsSyncSettings {
    fn default() -> Self {
        Self {
            managed_block_start: default_block_start(),
            managed_block_end: default_block_end(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSettings {
    #[serde(default)]
    pub ssh: SshSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub hosts_sync: HostsSyncSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceManager {
    Brew,
    Systemd,
}

impl std::fmt::Display for ServiceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceManager::Brew => write!(f, "brew"),
            ServiceManager::Systemd => write!(f, "systemd"),
        }
    }
}

/// Values applied to every node item unless the item overrides them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDefaults {
    pub ssh_user: Option<String>,
    pub service_manager: Option<ServiceManager>,
    pub ssh_host: Option<String>,
    pub ollama_service: Option<String>,
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeItem {
    pub name: String,
    pub mgmt_ip: String,
    pub ssh_user: Option<String>,
    pub service_manager: Option<ServiceManager>,
    pub ssh_host: Option<String>,
    pub ollama_service: Option<String>,
    pub models: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodesConfig {
    #[serde(default)]
    pub defaults: NodeDefaults,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<NodeItem>,
}

/// A node with defaults applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub ssh_user: String,
    pub mgmt_ip: String,
    pub service_manager: ServiceManager,
    pub ssh_host: Option<String>,
    pub ollama_service: String,
    pub models: Vec<String>,
}

impl Node {
    /// Host used for SSH: explicit override, else the management address
    pub fn ssh_host(&self) -> &str {
        self.ssh_host.as_deref().unwrap_or(&self.mgmt_ip)
    }

    /// `user@host` as passed to ssh
    pub fn ssh_target(&self) -> String {
        format!("{}@{}", self.ssh_user, self.ssh_host())
    }
}

fn default_netmask() -> String {
    "255.255.255.252".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricIpv4Defaults {
    #[serde(default = "default_netmask")]
    pub netmask: String,
    #[serde(default)]
    pub router: String,
}

impl Default for FabricIpv4Defaults {
    fn default() -> Self {
        Self {
            netmask: default_netmask(),
            router: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricNetNode {
    pub name: String,
    pub address: String,
}

fn default_service_name() -> String {
    "Thunderbolt Bridge".to_string()
}

/// Shared fabric networking section (typically Thunderbolt Bridge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricNetConfig {
    /// macOS network service name as listed by `networksetup -listallnetworkservices`
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub ipv4_mode: Ipv4Mode,
    #[serde(default)]
    pub ipv4_defaults: FabricIpv4Defaults,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nodes: Vec<FabricNetNode>,
}

impl Default for FabricNetConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            ipv4_mode: Ipv4Mode::default(),
            ipv4_defaults: FabricIpv4Defaults::default(),
            nodes: Vec::new(),
        }
    }
}

/// Root of tf.yml
///
/// Unknown top-level sections are ignored so one file can serve other tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub settings: FleetSettings,
    pub nodes: NodesConfig,
    #[serde(default)]
    pub fabricnet: Option<FabricNetConfig>,
}

impl TfConfig {
    /// Merge every node item over `nodes.defaults` (item values win)
    pub fn resolve_nodes(&self) -> Result<Vec<Node>> {
        let defaults = &self.nodes.defaults;
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.nodes.items.len());

        for item in &self.nodes.items {
            if !seen.insert(item.name.as_str()) {
                return Err(DomainError::DuplicateNode(item.name.clone()));
            }

            let ssh_user = item
                .ssh_user
                .clone()
                .or_else(|| defaults.ssh_user.clone())
                .ok_or_else(|| DomainError::MissingNodeField {
                    node: item.name.clone(),
                    field: "ssh_user",
                })?;
            let service_manager = item
                .service_manager
                .or(defaults.service_manager)
                .ok_or_else(|| DomainError::MissingNodeField {
                    node: item.name.clone(),
                    field: "service_manager",
                })?;

            resolved.push(Node {
                name: item.name.clone(),
                ssh_user,
                mgmt_ip: item.mgmt_ip.clone(),
                service_manager,
                ssh_host: item.ssh_host.clone().or_else(|| defaults.ssh_host.clone()),
                ollama_service: item
                    .ollama_service
                    .clone()
                    .or_else(|| defaults.ollama_service.clone())
                    .unwrap_or_else(|| "ollama".to_string()),
                models: item
                    .models
                    .clone()
                    .or_else(|| defaults.models.clone())
                    .unwrap_or_default(),
            });
        }

        Ok(resolved)
    }

    /// Fabric address per node name (empty without a `fabricnet` section)
    pub fn fabric_addresses(&self) -> HashMap<String, String> {
        self.fabricnet
            .as_ref()
            .map(|f| {
                f.nodes
                    .iter()
                    .map(|n| (n.name.clone(), n.address.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_timeout_bounds() {
        let ssh = |seconds: f64| SshSettings {
            connect_timeout_seconds: seconds,
            batch_mode: true,
        };

        assert_eq!(ssh(0.5).connect_timeout(), Duration::from_millis(500));
        assert_eq!(ssh(-3.0).connect_timeout(), Duration::ZERO);
        assert_eq!(ssh(f64::NAN).connect_timeout(), Duration::ZERO);
        assert_eq!(ssh(1e20).connect_timeout(), Duration::MAX);
        assert_eq!(ssh(f64::INFINITY).connect_timeout(), Duration::MAX);
    }

    fn config(items: serde_json::Value) -> TfConfig {
        serde_json::from_value(serde_json::json!({
            "nodes": {
                "defaults": {"ssh_user": "u", "service_manager": "brew"},
                "items": items,
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_item_fields() {
        let cfg = config(serde_json::json!([
            {"name": "msm1", "mgmt_ip": "192.168.1.101"},
            {"name": "msm2", "mgmt_ip": "192.168.1.102", "ssh_user": "admin", "service_manager": "systemd"}
        ]));

        let nodes = cfg.resolve_nodes().unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].ssh_user, "u");
        assert_eq!(nodes[0].service_manager, ServiceManager::Brew);
        assert_eq!(nodes[0].ollama_service, "ollama");
        assert!(nodes[0].models.is_empty());
        assert_eq!(nodes[1].ssh_user, "admin");
        assert_eq!(nodes[1].service_manager, ServiceManager::Systemd);
    }

    #[test]
    fn test_ssh_target_prefers_ssh_host() {
        let cfg = config(serde_json::json!([
            {"name": "msm1", "mgmt_ip": "192.168.1.101", "ssh_host": "1.2.3.4"},
            {"name": "msm2", "mgmt_ip": "192.168.1.102"}
        ]));

        let nodes = cfg.resolve_nodes().unwrap();
        assert_eq!(nodes[0].ssh_target(), "u@1.2.3.4");
        assert_eq!(nodes[1].ssh_target(), "u@192.168.1.102");
    }

    #[test]
    fn test_missing_ssh_user_is_reported() {
        let cfg: TfConfig = serde_json::from_value(serde_json::json!({
            "nodes": {"items": [{"name": "msm1", "mgmt_ip": "10.0.0.1", "service_manager": "brew"}]}
        }))
        .unwrap();

        let err = cfg.resolve_nodes().unwrap_err();
        assert_eq!(
            err,
            DomainError::MissingNodeField {
                node: "msm1".to_string(),
                field: "ssh_user"
            }
        );
    }

    #[test]
    fn test_duplicate_node_names_rejected() {
        let cfg = config(serde_json::json!([
            {"name": "msm1", "mgmt_ip": "10.0.0.1"},
            {"name": "msm1", "mgmt_ip": "10.0.0.2"}
        ]));

        assert!(matches!(
            cfg.resolve_nodes(),
            Err(DomainError::DuplicateNode(name)) if name == "msm1"
        ));
    }

    #[test]
    fn test_null_lists_become_empty() {
        let cfg: TfConfig = serde_json::from_value(serde_json::json!({
            "nodes": {"items": null},
            "fabricnet": {"nodes": null}
        }))
        .unwrap();

        assert!(cfg.nodes.items.is_empty());
        let fabric = cfg.fabricnet.unwrap();
        assert!(fabric.nodes.is_empty());
        assert_eq!(fabric.service_name, "Thunderbolt Bridge");
        assert_eq!(fabric.ipv4_mode, Ipv4Mode::Manual);
        assert_eq!(fabric.ipv4_defaults.netmask, "255.255.255.252");
    }

    #[test]
    fn test_section_defaults() {
        let cfg = config(serde_json::json!([]));
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
        assert_eq!(cfg.settings.monitor.ssh_port, 22);
        assert_eq!(cfg.settings.monitor.ollama_port, 11434);
        assert!(cfg.settings.ssh.batch_mode);
        assert_eq!(cfg.settings.hosts_sync.managed_block_start, "# BEGIN thunder-forge");
        assert!(cfg.fabric_addresses().is_empty());
    }
}
