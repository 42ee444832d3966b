// Subprocess executor
// reason: tokio::process so the runtime keeps serving signals while the tool runs
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{info, warn};

use thunder_forge_core::domain::ToolInvocation;
use thunder_forge_core::port::task_executor::{
    ExecutionError, ExecutionResult, ExecutionStatus, TaskExecutor,
};
use thunder_forge_core::port::TimeProvider;

/// Runs developer tools in the current directory with inherited stdio
pub struct SubprocessExecutor {
    time_provider: Arc<dyn TimeProvider>,
}

impl SubprocessExecutor {
    /// # Example
    /// ```ignore
    /// let executor = SubprocessExecutor::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }

    /// Build execution result from the exit status
    fn build_result(&self, status: ExitStatus, duration_ms: i64) -> ExecutionResult {
        let status_kind = if status.success() {
            ExecutionStatus::Success
        } else if killed_by_signal(&status) {
            ExecutionStatus::Killed
        } else {
            ExecutionStatus::Failed
        };

        ExecutionResult {
            status: status_kind,
            exit_code: status.code(),
            duration_ms,
        }
    }
}

#[cfg(unix)]
fn killed_by_signal(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    status.signal().is_some()
}

#[cfg(not(unix))]
fn killed_by_signal(_status: &ExitStatus) -> bool {
    false
}

#[async_trait]
impl TaskExecutor for SubprocessExecutor {
    async fn execute(&self, invocation: &ToolInvocation) -> Result<ExecutionResult, ExecutionError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %invocation.program,
            args = ?invocation.args,
            "Starting subprocess"
        );

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| ExecutionError::SpawnFailed(format!("{}: {}", invocation.program, e)))?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let result = self.build_result(status, duration_ms);

        if result.status == ExecutionStatus::Killed {
            warn!(program = %invocation.program, "Subprocess terminated by signal");
        }
        info!(
            program = %invocation.program,
            duration_ms = %duration_ms,
            exit_code = ?result.exit_code,
            status = ?result.status,
            "Subprocess completed"
        );

        Ok(result)
    }
}
