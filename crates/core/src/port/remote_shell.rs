// Remote Shell Port
// Runs commands on cluster nodes (OpenSSH in production)

use super::task_executor::ExecutionError;
use crate::domain::Node;
use async_trait::async_trait;

/// How the remote command is elevated
#[derive(Clone, PartialEq, Eq, Default)]
pub enum SudoMode {
    /// Run as the SSH user
    #[default]
    None,
    /// `sudo -n`: fail fast if sudo wants a password
    NonInteractive,
    /// `sudo -S -p ''` with the password sent on stdin (never logged)
    Password(String),
    /// Allocate a TTY and let sudo prompt on the remote; output is not captured
    Interactive,
}

impl std::fmt::Debug for SudoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SudoMode::None => write!(f, "None"),
            SudoMode::NonInteractive => write!(f, "NonInteractive"),
            SudoMode::Password(_) => write!(f, "Password(***)"),
            SudoMode::Interactive => write!(f, "Interactive"),
        }
    }
}

/// Command to run on a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub command: String,
    pub sudo: SudoMode,
    /// Log the command and its output
    pub echo: bool,
}

impl RemoteCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            sudo: SudoMode::None,
            echo: true,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn with_sudo(mut self, sudo: SudoMode) -> Self {
        self.sudo = sudo;
        self
    }

    /// Command line as executed on the remote side
    pub fn remote_line(&self) -> String {
        match self.sudo {
            SudoMode::None => self.command.clone(),
            SudoMode::NonInteractive => format!("sudo -n {}", self.command),
            SudoMode::Password(_) => format!("sudo -S -p '' {}", self.command),
            SudoMode::Interactive => format!("sudo {}", self.command),
        }
    }
}

/// Captured output (empty when the command ran on a TTY)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Run `command` on `node`
    ///
    /// # Errors
    /// - ExecutionError::RemoteFailed on a non-zero exit status
    /// - ExecutionError::SpawnFailed if ssh cannot be started
    async fn run(&self, node: &Node, command: &RemoteCommand)
        -> Result<RemoteOutput, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Scripted reply for commands containing a needle
    #[derive(Debug, Clone)]
    pub enum MockReply {
        Stdout(String),
        Fail { exit_code: i32, stderr: String },
    }

    /// Mock shell answering by first matching substring; unmatched commands succeed silently
    #[derive(Default)]
    pub struct MockRemoteShell {
        rules: Vec<(String, MockReply)>,
        calls: Mutex<Vec<(String, RemoteCommand)>>,
    }

    impl MockRemoteShell {
        pub fn new() -> Self {
            Self::default()
        }
        pub fn on(mut self, needle: impl Into<String>, reply: MockReply) -> Self {
            self.rules.push((needle.into(), reply));
            self
        }
        pub fn on_stdout(self, needle: impl Into<String>, stdout: impl Into<String>) -> Self {
            self.on(needle, MockReply::Stdout(stdout.into()))
        }
        /// (node name, command) pairs in call order
        pub fn calls(&self) -> Vec<(String, RemoteCommand)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteShell for MockRemoteShell {
        async fn run(
            &self,
            node: &Node,
            command: &RemoteCommand,
        ) -> Result<RemoteOutput, ExecutionError> {
            self.calls
                .lock()
                .unwrap()
                .push((node.name.clone(), command.clone()));

            let reply = self
                .rules
                .iter()
                .find(|(needle, _)| command.command.contains(needle.as_str()))
                .map(|(_, reply)| reply.clone());

            match reply {
                Some(MockReply::Stdout(stdout)) => Ok(RemoteOutput {
                    exit_code: Some(0),
                    stdout,
                    stderr: String::new(),
                }),
                Some(MockReply::Fail { exit_code, stderr }) => Err(ExecutionError::RemoteFailed {
                    node: node.name.clone(),
                    target: node.ssh_target(),
                    exit_code: Some(exit_code),
                    stderr,
                }),
                None => Ok(RemoteOutput {
                    exit_code: Some(0),
                    ..Default::default()
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_line_per_sudo_mode() {
        let cmd = RemoteCommand::new("networksetup -listallnetworkservices");
        assert_eq!(cmd.remote_line(), "networksetup -listallnetworkservices");
        assert_eq!(
            cmd.clone().with_sudo(SudoMode::NonInteractive).remote_line(),
            "sudo -n networksetup -listallnetworkservices"
        );
        assert_eq!(
            cmd.clone()
                .with_sudo(SudoMode::Password("hunter2".to_string()))
                .remote_line(),
            "sudo -S -p '' networksetup -listallnetworkservices"
        );
        assert_eq!(
            cmd.with_sudo(SudoMode::Interactive).remote_line(),
            "sudo networksetup -listallnetworkservices"
        );
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let cmd = RemoteCommand::new("true").with_sudo(SudoMode::Password("hunter2".to_string()));
        assert!(!format!("{:?}", cmd).contains("hunter2"));
    }
}
