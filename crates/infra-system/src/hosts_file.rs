// Hosts file adapter
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use thunder_forge_core::application::constants::SYSTEM_HOSTS_FILE;
use thunder_forge_core::port::HostsStore;
use thunder_forge_core::AppError;

/// Hosts file on the hub; writes go through `sudo tee` unless disabled
pub struct SystemHostsFile {
    path: PathBuf,
    use_sudo: bool,
}

impl SystemHostsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_sudo: true,
        }
    }

    /// `/etc/hosts` via sudo
    pub fn system() -> Self {
        Self::new(SYSTEM_HOSTS_FILE)
    }

    /// Write directly (files the current user owns)
    pub fn without_sudo(mut self) -> Self {
        self.use_sudo = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn sudo_tee(&self, content: &str) -> Result<(), AppError> {
        let mut child = Command::new("sudo")
            .arg("tee")
            .arg(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(content.as_bytes()).await?;
        }
        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(AppError::HostsUpdate {
                path: self.path.display().to_string(),
                rc: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HostsStore for SystemHostsFile {
    async fn read(&self) -> Result<String, AppError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    async fn write(&self, content: &str) -> Result<(), AppError> {
        if self.use_sudo {
            info!(path = %self.path.display(), "Writing hosts file via sudo");
            self.sudo_tee(content).await
        } else {
            tokio::fs::write(&self.path, content).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_write_without_sudo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "127.0.0.1 localhost\n").unwrap();
        let store = SystemHostsFile::new(&path).without_sudo();

        assert_eq!(store.read().await.unwrap(), "127.0.0.1 localhost\n");
        store.write("10.0.0.1 a\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10.0.0.1 a\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SystemHostsFile::new(dir.path().join("absent")).without_sudo();

        assert!(matches!(store.read().await, Err(AppError::Io(_))));
    }

    #[test]
    fn test_system_default_path() {
        assert_eq!(SystemHostsFile::system().path(), Path::new("/etc/hosts"));
    }

    #[test]
    fn test_update_failure_message() {
        let err = AppError::HostsUpdate {
            path: "/etc/hosts".to_string(),
            rc: 1,
            stderr: "sudo: a password is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to update /etc/hosts locally: rc=1\nsudo: a password is required"
        );
    }
}
