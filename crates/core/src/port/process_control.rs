// Process Control Port
// Port-owner lookup and signal delivery for the stop sequence

use super::task_executor::ExecutionError;
use async_trait::async_trait;

/// OS process control used by the stop sequence
///
/// Implementations:
/// - SignalProcessControl: lsof lookup + SIGTERM/SIGKILL via nix
#[async_trait]
pub trait ProcessControl: Send + Sync {
    /// PIDs of processes listening on the TCP port (may be empty)
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the lookup tool is unavailable
    async fn pids_on_port(&self, port: u16) -> Result<Vec<i32>, ExecutionError>;

    /// Ask the process to shut down (SIGTERM)
    fn terminate(&self, pid: i32) -> Result<(), ExecutionError>;

    /// Kill the process outright (SIGKILL)
    fn force_kill(&self, pid: i32) -> Result<(), ExecutionError>;

    /// Check if a process is still alive
    fn is_alive(&self, pid: i32) -> bool;

    /// Executable name, for log output only
    fn process_name(&self, _pid: i32) -> Option<String> {
        None
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock process table
    ///
    /// `terminate` ends every PID except those marked stubborn; `force_kill` ends anything.
    #[derive(Default)]
    pub struct MockProcessControl {
        listeners: Vec<i32>,
        stubborn: HashSet<i32>,
        vanished: HashSet<i32>,
        alive: Mutex<HashSet<i32>>,
        terminated: Mutex<Vec<i32>>,
        killed: Mutex<Vec<i32>>,
    }

    impl MockProcessControl {
        pub fn new(listeners: Vec<i32>) -> Self {
            Self {
                alive: Mutex::new(listeners.iter().copied().collect()),
                listeners,
                ..Default::default()
            }
        }
        /// PIDs that ignore SIGTERM
        pub fn with_stubborn(mut self, pids: &[i32]) -> Self {
            self.stubborn.extend(pids);
            self
        }
        /// PIDs that exit between lookup and signal delivery
        pub fn with_vanished(mut self, pids: &[i32]) -> Self {
            self.vanished.extend(pids);
            {
                let mut alive = self.alive.lock().unwrap();
                for pid in pids {
                    alive.remove(pid);
                }
            }
            self
        }
        pub fn terminated(&self) -> Vec<i32> {
            self.terminated.lock().unwrap().clone()
        }
        pub fn killed(&self) -> Vec<i32> {
            self.killed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessControl for MockProcessControl {
        async fn pids_on_port(&self, _port: u16) -> Result<Vec<i32>, ExecutionError> {
            Ok(self.listeners.clone())
        }
        fn terminate(&self, pid: i32) -> Result<(), ExecutionError> {
            if self.vanished.contains(&pid) {
                return Err(ExecutionError::Signal(format!("ESRCH: no such process {}", pid)));
            }
            self.terminated.lock().unwrap().push(pid);
            if !self.stubborn.contains(&pid) {
                self.alive.lock().unwrap().remove(&pid);
            }
            Ok(())
        }
        fn force_kill(&self, pid: i32) -> Result<(), ExecutionError> {
            if !self.alive.lock().unwrap().remove(&pid) {
                return Err(ExecutionError::Signal(format!("ESRCH: no such process {}", pid)));
            }
            self.killed.lock().unwrap().push(pid);
            Ok(())
        }
        fn is_alive(&self, pid: i32) -> bool {
            self.alive.lock().unwrap().contains(&pid)
        }
    }
}
