// Port-bound process termination (graceful, then forced)
use crate::port::{ExecutionError, ProcessControl};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::constants::STOP_GRACE_PERIOD;

/// What the stop sequence did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// No process was listening on the port
    NothingToStop,
    /// `signalled` received SIGTERM; `force_killed` were still alive after the grace period
    Stopped {
        signalled: Vec<i32>,
        force_killed: Vec<i32>,
    },
}

/// Stops whatever listens on a TCP port
pub struct PortStopper {
    control: Arc<dyn ProcessControl>,
    grace_period: Duration,
}

impl PortStopper {
    pub fn new(control: Arc<dyn ProcessControl>) -> Self {
        Self {
            control,
            grace_period: STOP_GRACE_PERIOD,
        }
    }

    /// Override the wait between the two signals (tests)
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Best-effort two-stage stop
    ///
    /// Signal delivery failures (process already gone) are swallowed; only the
    /// PID lookup itself can fail.
    pub async fn stop(&self, port: u16) -> Result<StopOutcome, ExecutionError> {
        let mut pids = self.control.pids_on_port(port).await?;
        pids.sort_unstable();
        pids.dedup();

        if pids.is_empty() {
            info!(port = %port, "No process on port, nothing to stop");
            return Ok(StopOutcome::NothingToStop);
        }

        for &pid in &pids {
            info!(
                port = %port,
                pid = %pid,
                name = ?self.control.process_name(pid),
                "Sending SIGTERM"
            );
            if let Err(e) = self.control.terminate(pid) {
                debug!(pid = %pid, error = %e, "SIGTERM not delivered");
            }
        }

        tokio::time::sleep(self.grace_period).await;

        let mut force_killed = Vec::new();
        for &pid in &pids {
            if !self.control.is_alive(pid) {
                continue;
            }
            warn!(pid = %pid, "Process still alive after grace period, sending SIGKILL");
            match self.control.force_kill(pid) {
                Ok(()) => force_killed.push(pid),
                Err(e) => debug!(pid = %pid, error = %e, "SIGKILL not delivered"),
            }
        }

        Ok(StopOutcome::Stopped {
            signalled: pids,
            force_killed,
        })
    }
}
