// Domain Layer - Pure business logic and entities

pub mod error;
pub mod fabric;
pub mod hosts;
pub mod inventory;
pub mod status;
pub mod task;
pub mod translations;

// Re-exports
pub use error::DomainError;
pub use fabric::{Ipv4Mode, MacosVersion};
pub use hosts::{build_hosts_block, upsert_managed_block, HostsBlock};
pub use inventory::{
    FabricIpv4Defaults, FabricNetConfig, FabricNetNode, FleetSettings, HostsSyncSettings,
    MonitorSettings, Node, NodeDefaults, NodeItem, NodesConfig, ServerConfig, ServiceManager,
    SshSettings, TfConfig,
};
pub use status::{ClusterStatus, NodeStatus, PortStatus};
pub use task::{Task, ToolInvocation};
pub use translations::{validate_translations, TranslationError, TranslationSummary};
