// Application Layer - Use Cases

pub mod constants;
pub mod fabricnet;
pub mod i18n;
pub mod local_hosts;
pub mod monitor;
pub mod port_stop;
pub mod task_runner;

// Re-exports
pub use fabricnet::{FabricnetError, FabricnetReport, FabricnetService, ReachabilityCheck};
pub use i18n::check_translations_file;
pub use local_hosts::{LocalHostsReport, LocalHostsService};
pub use monitor::ClusterMonitor;
pub use port_stop::{PortStopper, StopOutcome};
pub use task_runner::TaskRunner;
