// Fabric network setup (macOS networksetup over SSH)
use crate::domain::fabric::{
    getinfo_command, networksetup_command, parse_network_services, parse_service_ipv4,
    require_fabric_support,
};
use crate::domain::{DomainError, FabricNetConfig, Node, ServiceManager, TfConfig};
use crate::port::{ExecutionError, NetworkProbe, RemoteCommand, RemoteShell, SudoMode};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::constants::MIN_REACHABILITY_TIMEOUT;

const SUDO_PASSWORD_REQUIRED: &str = "sudo: a password is required";

/// Fabric setup failures; messages carry the operator guidance
#[derive(Error, Debug)]
pub enum FabricnetError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Remote(#[from] ExecutionError),

    #[error("no nodes matched --only={0:?}")]
    NoNodesMatched(String),

    #[error(
        "Missing top-level 'fabricnet' section in tf.yml.\n\
         What to do:\n\
         - Add something like:\n  \
           fabricnet:\n    \
             service_name: \"Thunderbolt Bridge\"\n    \
             ipv4_defaults:\n      \
               netmask: 255.255.255.252\n      \
               router: \"\"\n    \
             nodes:\n      \
               - name: msm1\n        \
                 address: 172.16.10.2"
    )]
    MissingSection,

    #[error(
        "{node}: missing fabricnet.nodes entry in tf.yml (fabricnet.nodes[].name={node})\n\
         What to do:\n\
         - Edit tf.yml and add an entry under fabricnet.nodes:\n    \
             - name: {node}\n      \
               address: 169.254.10.X\n\
         Notes:\n\
         - This runs macOS 'networksetup' over SSH, so it requires macOS on the node.\n\
         - Supported macOS: Tahoe 26.2+ only.\n\
         - This runs via 'sudo' on the node. If sudo requires a password, you'll be prompted in your terminal."
    )]
    MissingNodeAddress { node: String },

    #[error("{node}: fabricnet automation only supports macOS/brew nodes for now (service_manager: {manager})")]
    UnsupportedServiceManager {
        node: String,
        manager: ServiceManager,
    },

    #[error(
        "{node}: '{service}' is not a recognized network service on this node\n\
         What to do:\n\
         - SSH to the node and run: networksetup -listallnetworkservices\n\
         - Pick the exact name and set it in tf.yml under fabricnet.service_name\n\
         Available services on this node:\n{}",
        bullet_list(.available)
    )]
    UnknownService {
        node: String,
        service: String,
        available: Vec<String>,
    },

    #[error("{node}: failed to configure fabricnet: {source}\n{}", .hint.as_deref().unwrap_or(""))]
    ApplyFailed {
        node: String,
        hint: Option<String>,
        #[source]
        source: ExecutionError,
    },

    #[error(
        "{node}: fabricnet IP did not apply for service '{service}'\n\
         Expected: {expected}\n\
         Observed: {}\n\
         What to check:\n\
         - Verify the exact service name: networksetup -listallnetworkservices\n\
         - Inspect service state: networksetup -getinfo <service>\n\
         - Ensure the Thunderbolt link is up and no bridging is enabled",
        .observed.as_deref().unwrap_or("(unknown)")
    )]
    AddressNotApplied {
        node: String,
        service: String,
        expected: String,
        observed: Option<String>,
    },
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none detected)".to_string();
    }
    items
        .iter()
        .map(|s| format!("- {}", s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Hub-side TCP check of one configured fabric address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilityCheck {
    pub node: String,
    pub address: String,
    pub port: u16,
    pub reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricnetReport {
    /// Nodes configured, in order
    pub configured: Vec<String>,
    /// Nodes selected for this run
    pub total: usize,
    pub reachability: Vec<ReachabilityCheck>,
}

impl FabricnetReport {
    pub fn unreachable(&self) -> Vec<&str> {
        self.reachability
            .iter()
            .filter(|c| !c.reachable)
            .map(|c| c.node.as_str())
            .collect()
    }
}

/// Parse `--only a,b` (blank entries ignored)
pub fn parse_only(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct FabricnetService {
    shell: Arc<dyn RemoteShell>,
    probe: Arc<dyn NetworkProbe>,
}

impl FabricnetService {
    pub fn new(shell: Arc<dyn RemoteShell>, probe: Arc<dyn NetworkProbe>) -> Self {
        Self { shell, probe }
    }

    /// Configure the fabric address on every selected node, then verify reachability from the hub
    ///
    /// Nodes are configured one at a time; the first failure aborts the run.
    pub async fn configure(
        &self,
        config: &TfConfig,
        only: Option<&str>,
    ) -> Result<FabricnetReport, FabricnetError> {
        let mut nodes = config.resolve_nodes()?;
        if let Some(raw) = only {
            let wanted = parse_only(raw);
            nodes.retain(|n| wanted.contains(&n.name));
            if nodes.is_empty() {
                return Err(FabricnetError::NoNodesMatched(raw.to_string()));
            }
        }

        let fabricnet = config
            .fabricnet
            .as_ref()
            .ok_or(FabricnetError::MissingSection)?;
        let addresses = config.fabric_addresses();

        let mut plan = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let address = addresses
                .get(&node.name)
                .ok_or_else(|| FabricnetError::MissingNodeAddress {
                    node: node.name.clone(),
                })?;
            plan.push((node, address.as_str()));
        }

        let mut configured = Vec::with_capacity(plan.len());
        for &(node, address) in &plan {
            self.configure_node(node, address, fabricnet).await?;
            configured.push(node.name.clone());
        }
        info!(
            configured = configured.len(),
            total = nodes.len(),
            "Configured fabricnet on {}",
            configured.join(", ")
        );

        let ssh_port = config.settings.monitor.ssh_port;
        let timeout = config.settings.ssh.connect_timeout()
            .max(MIN_REACHABILITY_TIMEOUT);
        let mut reachability = Vec::with_capacity(plan.len());
        for &(node, address) in &plan {
            let reachable = self.probe.tcp_reachable(address, ssh_port, timeout).await;
            if !reachable {
                warn!(node = %node.name, address = %address, port = ssh_port, "Fabric address unreachable from hub");
            }
            reachability.push(ReachabilityCheck {
                node: node.name.clone(),
                address: address.to_string(),
                port: ssh_port,
                reachable,
            });
        }

        Ok(FabricnetReport {
            configured,
            total: nodes.len(),
            reachability,
        })
    }

    async fn configure_node(
        &self,
        node: &Node,
        address: &str,
        fabricnet: &FabricNetConfig,
    ) -> Result<(), FabricnetError> {
        if node.service_manager != ServiceManager::Brew {
            return Err(FabricnetError::UnsupportedServiceManager {
                node: node.name.clone(),
                manager: node.service_manager,
            });
        }

        // 1) version gate
        let version = self
            .shell
            .run(node, &RemoteCommand::new("sw_vers -productVersion"))
            .await?;
        require_fabric_support(&node.name, &version.stdout)?;

        // 2) the service must exist; the full list is only shown on error
        let listing = self
            .shell
            .run(
                node,
                &RemoteCommand::new("networksetup -listallnetworkservices").quiet(),
            )
            .await?;
        let services = parse_network_services(&listing.stdout);
        if !services.iter().any(|s| s == &fabricnet.service_name) {
            return Err(FabricnetError::UnknownService {
                node: node.name.clone(),
                service: fabricnet.service_name.clone(),
                available: services,
            });
        }

        // 3) apply; sudo prompts on the remote TTY
        info!(node = %node.name, address = %address, service = %fabricnet.service_name, "Setting fabric address");
        let defaults = &fabricnet.ipv4_defaults;
        let command = networksetup_command(
            fabricnet.ipv4_mode,
            &fabricnet.service_name,
            address,
            &defaults.netmask,
            &defaults.router,
        );
        if let Err(source) = self
            .shell
            .run(
                node,
                &RemoteCommand::new(command).with_sudo(SudoMode::Interactive),
            )
            .await
        {
            let hint = source
                .to_string()
                .contains(SUDO_PASSWORD_REQUIRED)
                .then(|| sudo_hint(node, address, fabricnet));
            return Err(FabricnetError::ApplyFailed {
                node: node.name.clone(),
                hint,
                source,
            });
        }

        // 4) read back: networksetup can report success while a self-assigned IP stays active
        let info = self
            .shell
            .run(node, &RemoteCommand::new(getinfo_command(&fabricnet.service_name)))
            .await?;
        let observed = parse_service_ipv4(&info.stdout);
        if observed.as_deref() != Some(address) {
            return Err(FabricnetError::AddressNotApplied {
                node: node.name.clone(),
                service: fabricnet.service_name.clone(),
                expected: address.to_string(),
                observed,
            });
        }

        Ok(())
    }
}

fn sudo_hint(node: &Node, address: &str, fabricnet: &FabricNetConfig) -> String {
    let manual = networksetup_command(
        fabricnet.ipv4_mode,
        &fabricnet.service_name,
        address,
        &fabricnet.ipv4_defaults.netmask,
        &fabricnet.ipv4_defaults.router,
    );
    [
        "Cause: sudo did not accept a password (wrong password, or user not permitted).".to_string(),
        "What to do:".to_string(),
        format!("- SSH to the node on mgmt: ssh {}", node.ssh_target()),
        "- Run: sudo -v (ensure it succeeds)".to_string(),
        "- Then run the networksetup command manually:".to_string(),
        format!("  sudo {}", manual),
        format!(
            "- Re-run: thunder-forge setup-env fabricnet --only {}",
            node.name
        ),
    ]
    .join("\n")
}
