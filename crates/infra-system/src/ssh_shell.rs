// OpenSSH remote shell
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use thunder_forge_core::domain::{Node, SshSettings};
use thunder_forge_core::port::remote_shell::{RemoteCommand, RemoteOutput, RemoteShell, SudoMode};
use thunder_forge_core::port::task_executor::ExecutionError;

/// Runs commands through the local `ssh` client
pub struct SshShell {
    settings: SshSettings,
    program: PathBuf,
}

impl SshShell {
    pub fn new(settings: SshSettings) -> Self {
        Self {
            settings,
            program: PathBuf::from("ssh"),
        }
    }

    /// Use another ssh-compatible client binary
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

/// Arguments passed to `ssh` (without the program name)
pub fn ssh_args(settings: &SshSettings, node: &Node, command: &RemoteCommand) -> Vec<String> {
    let connect_timeout = settings.connect_timeout_seconds.ceil().max(1.0) as u64;
    let mut args = vec![
        "-o".to_string(),
        format!("ConnectTimeout={}", connect_timeout),
        "-o".to_string(),
        "ServerAliveInterval=5".to_string(),
        "-o".to_string(),
        "ServerAliveCountMax=1".to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=accept-new".to_string(),
    ];
    if settings.batch_mode {
        args.push("-o".to_string());
        args.push("BatchMode=yes".to_string());
    }
    if command.sudo == SudoMode::Interactive {
        args.push("-tt".to_string());
    }
    args.push(node.ssh_target());
    args.push(command.remote_line());
    args
}

/// First line of a command for logs ("…" marks elided lines)
fn log_line(command: &str) -> String {
    let mut lines = command.lines();
    let first = lines.next().unwrap_or_default();
    if lines.next().is_some() {
        format!("{} …", first)
    } else {
        first.to_string()
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(
        &self,
        node: &Node,
        command: &RemoteCommand,
    ) -> Result<RemoteOutput, ExecutionError> {
        let target = node.ssh_target();
        if command.echo {
            info!(node = %node.name, target = %target, "$ {}", log_line(&command.command));
        } else {
            debug!(node = %node.name, target = %target, "Running remote command");
        }

        let mut cmd = Command::new(&self.program);
        cmd.args(ssh_args(&self.settings, node, command));

        let (exit_code, stdout, stderr) = match &command.sudo {
            SudoMode::Interactive => {
                // sudo prompts on the user's terminal; nothing is captured
                let status = cmd
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(|e| ExecutionError::SpawnFailed(format!("ssh: {}", e)))?;
                (status.code(), String::new(), String::new())
            }
            SudoMode::Password(secret) => {
                let mut child = cmd
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(|e| ExecutionError::SpawnFailed(format!("ssh: {}", e)))?;
                if let Some(mut stdin) = child.stdin.take() {
                    stdin
                        .write_all(format!("{}\n", secret).as_bytes())
                        .await
                        .map_err(|e| ExecutionError::IoError(e.to_string()))?;
                }
                let output = child
                    .wait_with_output()
                    .await
                    .map_err(|e| ExecutionError::IoError(e.to_string()))?;
                (
                    output.status.code(),
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                )
            }
            SudoMode::None | SudoMode::NonInteractive => {
                let output = cmd
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(|e| ExecutionError::SpawnFailed(format!("ssh: {}", e)))?;
                (
                    output.status.code(),
                    String::from_utf8_lossy(&output.stdout).into_owned(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                )
            }
        };

        if exit_code != Some(0) {
            return Err(ExecutionError::RemoteFailed {
                node: node.name.clone(),
                target,
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        if command.echo && !stdout.trim().is_empty() {
            debug!(node = %node.name, stdout = %stdout.trim(), "Remote output");
        }

        Ok(RemoteOutput {
            exit_code,
            stdout,
            stderr,
        })
    }
}
