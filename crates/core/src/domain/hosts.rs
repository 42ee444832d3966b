// Managed /etc/hosts block

use super::error::Result;
use super::inventory::{HostsSyncSettings, TfConfig};

/// Rendered managed block, markers included, ending with a newline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostsBlock(String);

impl HostsBlock {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HostsBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stable hostname per interface: `<name>-mgmt`, plus `<name>-fabric` when configured
pub fn build_hosts_block(config: &TfConfig) -> Result<HostsBlock> {
    let settings = &config.settings.hosts_sync;
    let fabric = config.fabric_addresses();

    let mut lines = vec![settings.managed_block_start.clone()];
    for node in config.resolve_nodes()? {
        lines.push(format!("{} {}-mgmt", node.mgmt_ip, node.name));
        if let Some(fabric_ip) = fabric.get(&node.name).filter(|ip| !ip.is_empty()) {
            lines.push(format!("{} {}-fabric", fabric_ip, node.name));
        }
    }
    lines.push(settings.managed_block_end.clone());

    Ok(HostsBlock(lines.join("\n") + "\n"))
}

/// Replace the existing managed span, or append the block when there is none
pub fn upsert_managed_block(
    hosts_text: &str,
    block: &HostsBlock,
    settings: &HostsSyncSettings,
) -> String {
    let start = &settings.managed_block_start;
    let end = &settings.managed_block_end;
    let managed = block.as_str().trim_end_matches('\n');

    if let (Some(start_idx), Some(end_idx)) = (hosts_text.find(start), hosts_text.find(end)) {
        if end_idx > start_idx {
            let before = hosts_text[..start_idx].trim_end_matches('\n');
            let after = hosts_text[end_idx + end.len()..].trim_start_matches('\n');

            let mut parts = Vec::with_capacity(3);
            if !before.is_empty() {
                parts.push(before);
            }
            parts.push(managed);
            if !after.is_empty() {
                parts.push(after);
            }
            return parts.join("\n").trim_end_matches('\n').to_string() + "\n";
        }
    }

    let mut text = hosts_text.trim_end_matches('\n').to_string();
    if !text.is_empty() {
        text.push_str("\n\n");
    }
    text.push_str(managed);
    text.push('\n');
    text
}
