// Thunder Forge Infrastructure - System Adapters
// Implements: ProcessControl, TaskExecutor, RemoteShell, NetworkProbe, HostsStore

pub mod file_config;
pub mod hosts_file;
pub mod process_control_impl;
pub mod ssh_shell;
pub mod subprocess_executor;
pub mod tcp_probe;

pub use file_config::{expand_path, load_config};
pub use hosts_file::SystemHostsFile;
pub use process_control_impl::SignalProcessControl;
pub use ssh_shell::SshShell;
pub use subprocess_executor::SubprocessExecutor;
pub use tcp_probe::TcpProbe;
