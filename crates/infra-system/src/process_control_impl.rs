// Process control implementation
// reason: lsof for port ownership, nix for signals, sysinfo for process names
use async_trait::async_trait;
use std::process::Stdio;
use sysinfo::{Pid as SysPid, System};
use tokio::process::Command;
use tracing::debug;

use thunder_forge_core::port::process_control::ProcessControl;
use thunder_forge_core::port::task_executor::ExecutionError;

/// `lsof` + POSIX signals
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalProcessControl;

impl SignalProcessControl {
    pub fn new() -> Self {
        Self
    }
}

/// PIDs from `lsof -t` output (one per line; junk lines ignored)
pub fn parse_lsof_pids(stdout: &str) -> Vec<i32> {
    let mut pids: Vec<i32> = stdout
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}

#[async_trait]
impl ProcessControl for SignalProcessControl {
    async fn pids_on_port(&self, port: u16) -> Result<Vec<i32>, ExecutionError> {
        let output = Command::new("lsof")
            .args(["-t", "-nP", &format!("-iTCP:{}", port), "-sTCP:LISTEN"])
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ExecutionError::SpawnFailed(format!("lsof: {}", e)))?;

        // lsof exits 1 when nothing matches
        match output.status.code() {
            Some(0) | Some(1) => {}
            code => {
                return Err(ExecutionError::IoError(format!(
                    "lsof exited with {:?}: {}",
                    code,
                    String::from_utf8_lossy(&output.stderr).trim()
                )))
            }
        }

        let pids = parse_lsof_pids(&String::from_utf8_lossy(&output.stdout));
        debug!(port, pids = ?pids, "Resolved port listeners");
        Ok(pids)
    }

    fn terminate(&self, pid: i32) -> Result<(), ExecutionError> {
        send_signal(pid, Signal::Term)
    }

    fn force_kill(&self, pid: i32) -> Result<(), ExecutionError> {
        send_signal(pid, Signal::Kill)
    }

    fn is_alive(&self, pid: i32) -> bool {
        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::kill;
            use nix::unistd::Pid;

            // Signal 0 checks existence; EPERM means it exists but belongs to someone else
            matches!(kill(Pid::from_raw(pid), None), Ok(()) | Err(Errno::EPERM))
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
            false
        }
    }

    fn process_name(&self, pid: i32) -> Option<String> {
        let pid = SysPid::from_u32(u32::try_from(pid).ok()?);
        let mut system = System::new();
        if !system.refresh_process(pid) {
            return None;
        }
        system.process(pid).map(|p| p.name().to_string())
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Term,
    Kill,
}

#[cfg(unix)]
fn send_signal(pid: i32, signal: Signal) -> Result<(), ExecutionError> {
    use nix::sys::signal::{kill, Signal as NixSignal};
    use nix::unistd::Pid;

    let nix_signal = match signal {
        Signal::Term => NixSignal::SIGTERM,
        Signal::Kill => NixSignal::SIGKILL,
    };
    kill(Pid::from_raw(pid), nix_signal)
        .map_err(|e| ExecutionError::Signal(format!("{} to {} failed: {}", nix_signal, pid, e)))
}

#[cfg(not(unix))]
fn send_signal(pid: i32, signal: Signal) -> Result<(), ExecutionError> {
    Err(ExecutionError::Unsupported(format!(
        "{:?} to {} needs POSIX signals",
        signal, pid
    )))
}
