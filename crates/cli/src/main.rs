//! thunder-forge - cluster tooling for the hub machine

mod logging;
mod output;
mod rpc_client;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use thunder_forge_api_rpc::types::method;
use thunder_forge_api_rpc::{RpcServer, RpcServerConfig};
use thunder_forge_core::application::constants::{
    CONFIG_PATH_ENV, DEFAULT_BIND, DEFAULT_CONFIG_PATH, DEFAULT_HOSTS_ARTIFACT, DEFAULT_PORT,
    DEFAULT_TRANSLATIONS_PATH, SYSTEM_HOSTS_FILE,
};
use thunder_forge_core::application::{
    check_translations_file, ClusterMonitor, FabricnetService, LocalHostsService, PortStopper,
    TaskRunner,
};
use thunder_forge_core::domain::{ClusterStatus, Task, TfConfig};
use thunder_forge_core::port::time_provider::SystemTimeProvider;
use thunder_forge_infra_system::{
    expand_path, load_config, SignalProcessControl, SshShell, SubprocessExecutor,
    SystemHostsFile, TcpProbe,
};

/// Exit code for fabric setup failures and unreachable fabric addresses
const EXIT_FABRICNET: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "thunder-forge")]
#[command(about = "Thunder Forge cluster tooling", long_about = None)]
#[command(version)]
struct Cli {
    /// Inventory file
    #[arg(long, global = true, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch/update project dependencies
    Sync {
        /// Extra arguments for the underlying tool (after `--`)
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Run the test suite quietly
    Test {
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Reformat the source tree
    Format {
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Run tests with coverage instrumentation
    Coverage {
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Stop whatever listens on the port, then serve cluster status there
    Serve {
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        #[arg(long, env = "BIND")]
        bind: Option<String>,
    },

    /// Terminate processes listening on PORT (SIGTERM, short wait, SIGKILL)
    Stop {
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Validate the translations JSON file
    CheckI18n {
        #[arg(long, default_value = DEFAULT_TRANSLATIONS_PATH)]
        path: String,
    },

    /// Configure the cluster environment from tf.yml
    SetupEnv {
        #[arg(value_enum, default_value_t = SetupTarget::Fabricnet)]
        target: SetupTarget,

        /// Comma-separated node names (fabricnet)
        #[arg(long)]
        only: Option<String>,

        /// Managed block artifact (local-hosts)
        #[arg(long, default_value = DEFAULT_HOSTS_ARTIFACT)]
        out: String,
    },

    /// Write the managed hosts block and upsert it into the hub's hosts file
    LocalHosts {
        #[arg(long, default_value = DEFAULT_HOSTS_ARTIFACT)]
        out: String,

        /// Hosts file to update directly, without sudo
        #[arg(long)]
        hosts_file: Option<String>,
    },

    /// Probe every node's management and fabric addresses
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Ask a running `serve` instead of probing from here
        #[arg(long)]
        remote: bool,

        /// Status server URL for --remote (default: server.bind/port from tf.yml)
        #[arg(long, env = "TF_SERVER_URL")]
        url: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SetupTarget {
    Fabricnet,
    LocalHosts,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("warning: logging disabled: {:#}", e);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = expand_path(&cli.config);

    match cli.command {
        Commands::Sync { args } => run_task(Task::Sync, &args).await,
        Commands::Test { args } => run_task(Task::Test, &args).await,
        Commands::Format { args } => run_task(Task::Format, &args).await,
        Commands::Coverage { args } => run_task(Task::Coverage, &args).await,

        Commands::Stop { port } => {
            let outcome = stopper().stop(port).await?;
            println!("{}", output::stop_outcome(port, &outcome));
            Ok(ExitCode::SUCCESS)
        }

        Commands::Serve { port, bind } => serve(&config_path, port, bind).await,

        Commands::CheckI18n { path } => {
            let path = expand_path(&path);
            match check_translations_file(&path) {
                Ok(summary) => {
                    println!(
                        "{} {} OK ({} keys)",
                        "✓".green(),
                        path.display(),
                        summary.keys
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{} {}", "✗".red().bold(), e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }

        Commands::SetupEnv { target, only, out } => {
            let config = load_config(&config_path)?;
            match target {
                SetupTarget::Fabricnet => setup_fabricnet(&config, only.as_deref()).await,
                SetupTarget::LocalHosts => local_hosts(&config, &out, None).await,
            }
        }

        Commands::LocalHosts { out, hosts_file } => {
            let config = load_config(&config_path)?;
            local_hosts(&config, &out, hosts_file.as_deref()).await
        }

        Commands::Status { json, remote, url } => {
            let config = load_config(&config_path)?;
            let status = if remote {
                let url = url.unwrap_or_else(|| {
                    rpc_client::server_url(&config.server.bind, config.server.port)
                });
                let value = rpc_client::call_rpc(&url, method::CLUSTER_STATUS, json!({})).await?;
                serde_json::from_value::<ClusterStatus>(value)
                    .context("Unexpected cluster.status.v1 response")?
            } else {
                monitor().status(&config).await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("{}", output::status_table(&status));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn stopper() -> PortStopper {
    PortStopper::new(Arc::new(SignalProcessControl::new()))
}

fn monitor() -> ClusterMonitor {
    ClusterMonitor::new(Arc::new(TcpProbe::new()), Arc::new(SystemTimeProvider))
}

async fn run_task(task: Task, args: &[String]) -> Result<ExitCode> {
    let runner = TaskRunner::new(Arc::new(SubprocessExecutor::new(Arc::new(
        SystemTimeProvider,
    ))));
    let result = runner
        .run(task, args)
        .await
        .with_context(|| format!("Failed to run task '{}'", task))?;

    Ok(ExitCode::from(exit_status_byte(result.shell_exit_code())))
}

/// Process exit status for a child's exit code (out-of-range codes become 1)
fn exit_status_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

/// Server address: CLI/env first, then tf.yml, then defaults
fn resolve_listen(
    config: Option<&TfConfig>,
    port: Option<u16>,
    bind: Option<String>,
) -> RpcServerConfig {
    RpcServerConfig {
        host: bind
            .or_else(|| config.map(|c| c.server.bind.clone()))
            .unwrap_or_else(|| DEFAULT_BIND.to_string()),
        port: port
            .or_else(|| config.map(|c| c.server.port))
            .unwrap_or(DEFAULT_PORT),
    }
}

async fn serve(config_path: &Path, port: Option<u16>, bind: Option<String>) -> Result<ExitCode> {
    let (addr, handle) = bind_server(&stopper(), config_path, port, bind).await?;

    println!("{} Serving cluster status on http://{}", "✓".green(), addr);
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    handle.stopped().await;
    info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}

/// Load tf.yml and start the status server on a cleared port
///
/// The port is cleared even when tf.yml cannot be loaded.
async fn bind_server(
    stopper: &PortStopper,
    config_path: &Path,
    port: Option<u16>,
    bind: Option<String>,
) -> Result<(std::net::SocketAddr, thunder_forge_api_rpc::ServerHandle)> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            let listen = resolve_listen(None, port, bind);
            let outcome = stopper.stop(listen.port).await?;
            info!(port = listen.port, ?outcome, "Port cleared");
            return Err(e.into());
        }
    };
    let listen = resolve_listen(Some(&config), port, bind);

    let port = listen.port;
    let server = RpcServer::new(listen, Arc::new(config), monitor());
    start_after_stop(stopper, server, port).await
}

/// Run the stop sequence on `port`, then bind the server there
async fn start_after_stop(
    stopper: &PortStopper,
    server: RpcServer,
    port: u16,
) -> Result<(std::net::SocketAddr, thunder_forge_api_rpc::ServerHandle)> {
    let outcome = stopper.stop(port).await?;
    info!(port, ?outcome, "Port cleared");

    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))
}

async fn setup_fabricnet(config: &TfConfig, only: Option<&str>) -> Result<ExitCode> {
    let service = FabricnetService::new(
        Arc::new(SshShell::new(config.settings.ssh.clone())),
        Arc::new(TcpProbe::new()),
    );

    match service.configure(config, only).await {
        Ok(report) => {
            println!("{}", output::fabricnet_report(&report));
            if report.unreachable().is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_FABRICNET))
            }
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            Ok(ExitCode::from(EXIT_FABRICNET))
        }
    }
}

async fn local_hosts(
    config: &TfConfig,
    out: &str,
    hosts_file: Option<&str>,
) -> Result<ExitCode> {
    let (store, hosts_path) = match hosts_file {
        Some(path) => {
            let path = expand_path(path);
            let shown = path.display().to_string();
            (SystemHostsFile::new(path).without_sudo(), shown)
        }
        None => (SystemHostsFile::system(), SYSTEM_HOSTS_FILE.to_string()),
    };

    let artifact: PathBuf = expand_path(out);
    let report = LocalHostsService::new(Arc::new(store))
        .apply(config, &artifact)
        .await?;

    println!("{}", output::local_hosts(&report, &hosts_path));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use thunder_forge_core::port::{ExecutionError, ProcessControl};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_task_passes_trailing_args() {
        let cli = Cli::try_parse_from(["thunder-forge", "test", "--", "--nocapture", "inventory"])
            .unwrap();
        match cli.command {
            Commands::Test { args } => assert_eq!(args, vec!["--nocapture", "inventory"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_setup_env_defaults_to_fabricnet() {
        let cli = Cli::try_parse_from(["thunder-forge", "setup-env", "--only", "msm1,msm2"]).unwrap();
        match cli.command {
            Commands::SetupEnv { target, only, out } => {
                assert_eq!(target, SetupTarget::Fabricnet);
                assert_eq!(only.as_deref(), Some("msm1,msm2"));
                assert_eq!(out, DEFAULT_HOSTS_ARTIFACT);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["thunder-forge", "setup-env", "local-hosts"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::SetupEnv {
                target: SetupTarget::LocalHosts,
                ..
            }
        ));
    }

    #[test]
    fn test_stop_port_flag() {
        let cli = Cli::try_parse_from(["thunder-forge", "stop", "--port", "9100"]).unwrap();
        assert!(matches!(cli.command, Commands::Stop { port: 9100 }));
    }

    #[test]
    fn test_resolve_listen_precedence() {
        let config: TfConfig = serde_json::from_value(serde_json::json!({
            "server": {"bind": "0.0.0.0", "port": 9000},
            "nodes": {"items": []}
        }))
        .unwrap();

        let listen = resolve_listen(Some(&config), None, None);
        assert_eq!(listen.host, "0.0.0.0");
        assert_eq!(listen.port, 9000);

        let listen = resolve_listen(Some(&config), Some(8100), Some("127.0.0.1".into()));
        assert_eq!(listen.host, "127.0.0.1");
        assert_eq!(listen.port, 8100);

        assert_eq!(resolve_listen(None, None, None), RpcServerConfig::default());
    }

    /// Holds a port until terminated, like a previous server instance
    struct PreviousInstance {
        listener: std::sync::Mutex<Option<std::net::TcpListener>>,
    }

    #[async_trait::async_trait]
    impl ProcessControl for PreviousInstance {
        async fn pids_on_port(&self, _port: u16) -> Result<Vec<i32>, ExecutionError> {
            Ok(if self.is_alive(4242) { vec![4242] } else { vec![] })
        }

        fn terminate(&self, _pid: i32) -> Result<(), ExecutionError> {
            self.listener.lock().unwrap().take();
            Ok(())
        }

        fn force_kill(&self, pid: i32) -> Result<(), ExecutionError> {
            self.terminate(pid)
        }

        fn is_alive(&self, _pid: i32) -> bool {
            self.listener.lock().unwrap().is_some()
        }
    }

    #[tokio::test]
    async fn test_serve_clears_port_before_binding() {
        let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = held.local_addr().unwrap().port();
        let control = Arc::new(PreviousInstance {
            listener: std::sync::Mutex::new(Some(held)),
        });
        let server = RpcServer::new(
            RpcServerConfig {
                host: "127.0.0.1".to_string(),
                port,
            },
            Arc::new(serde_json::from_value(json!({"nodes": {"items": []}})).unwrap()),
            monitor(),
        );

        let (addr, handle) = start_after_stop(&PortStopper::new(control.clone()), server, port)
            .await
            .unwrap();

        assert_eq!(addr.port(), port);
        assert!(!control.is_alive(4242));
        handle.stop().unwrap();
        handle.stopped().await;
    }

    #[tokio::test]
    async fn test_serve_clears_port_without_inventory() {
        let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = held.local_addr().unwrap().port();
        let control = Arc::new(PreviousInstance {
            listener: std::sync::Mutex::new(Some(held)),
        });

        let err = bind_server(
            &PortStopper::new(control.clone()),
            Path::new("/nonexistent/tf.yml"),
            Some(port),
            None,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Missing config file"));
        assert!(!control.is_alive(4242));
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_status_byte(0), 0);
        assert_eq!(exit_status_byte(3), 3);
        assert_eq!(exit_status_byte(300), 1);
        assert_eq!(exit_status_byte(-1), 1);
    }
}
