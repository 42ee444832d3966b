// Port Layer - Interfaces for external dependencies

pub mod hosts_store;
pub mod network_probe;
pub mod process_control;
pub mod remote_shell;
pub mod task_executor;
pub mod time_provider;

// Re-exports
pub use hosts_store::HostsStore;
pub use network_probe::NetworkProbe;
pub use process_control::ProcessControl;
pub use remote_shell::{RemoteCommand, RemoteOutput, RemoteShell, SudoMode};
pub use task_executor::{ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor};
pub use time_provider::TimeProvider;
