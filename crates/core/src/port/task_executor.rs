// Task Executor Port
// Abstraction for running external developer tools (cargo, formatters, coverage)

use crate::domain::ToolInvocation;
use async_trait::async_trait;
use thiserror::Error;

/// Result of task execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    pub duration_ms: i64,
    pub exit_code: Option<i32>,
}

impl ExecutionResult {
    /// Exit code to hand back to the shell (signals and unknown map to 1)
    pub fn shell_exit_code(&self) -> i32 {
        match (self.status.clone(), self.exit_code) {
            (ExecutionStatus::Success, _) => 0,
            (_, Some(code)) if code != 0 => code,
            _ => 1,
        }
    }
}

/// Execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Success,
    Failed,
    Killed,
}

/// Execution errors shared by every process-facing port
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Signal delivery failed: {0}")]
    Signal(String),

    #[error("SSH failed for {node} ({target}): rc={}\n{stderr}", rc_label(.exit_code))]
    RemoteFailed {
        node: String,
        target: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    IoError(String),
}

fn rc_label(exit_code: &Option<i32>) -> String {
    exit_code
        .map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}

/// Task Executor trait
///
/// Implementations:
/// - SubprocessExecutor: spawns the tool with inherited stdio
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Run the invocation to completion and report how it ended
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the program cannot be started
    async fn execute(&self, invocation: &ToolInvocation) -> Result<ExecutionResult, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};
    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with the given code
        Exit(i32),
        /// Fail to spawn with message
        Fail(String),
    }
    /// Mock Task Executor for testing
    pub struct MockTaskExecutor {
        behavior: MockBehavior,
        calls: Arc<Mutex<Vec<ToolInvocation>>>,
    }
    impl MockTaskExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_success() -> Self {
            Self::new(MockBehavior::Exit(0))
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }
        pub fn calls(&self) -> Vec<ToolInvocation> {
            self.calls.lock().unwrap().clone()
        }
    }
    #[async_trait]
    impl TaskExecutor for MockTaskExecutor {
        async fn execute(
            &self,
            invocation: &ToolInvocation,
        ) -> Result<ExecutionResult, ExecutionError> {
            self.calls.lock().unwrap().push(invocation.clone());

            match &self.behavior {
                MockBehavior::Exit(code) => Ok(ExecutionResult {
                    status: if *code == 0 {
                        ExecutionStatus::Success
                    } else {
                        ExecutionStatus::Failed
                    },
                    duration_ms: 10,
                    exit_code: Some(*code),
                }),
                MockBehavior::Fail(msg) => Err(ExecutionError::SpawnFailed(msg.clone())),
            }
        }
    }
}
