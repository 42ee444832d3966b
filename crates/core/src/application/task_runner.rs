// Pass-through developer tasks
use crate::domain::Task;
use crate::port::{ExecutionError, ExecutionResult, TaskExecutor};
use std::sync::Arc;
use tracing::info;

/// Runs named tasks through the executor port; exit status is propagated untouched
pub struct TaskRunner {
    executor: Arc<dyn TaskExecutor>,
}

impl TaskRunner {
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self { executor }
    }

    pub async fn run(
        &self,
        task: Task,
        extra_args: &[String],
    ) -> Result<ExecutionResult, ExecutionError> {
        let invocation = task.invocation(extra_args);
        info!(task = %task, command = %invocation, "Running task");

        let result = self.executor.execute(&invocation).await?;

        info!(
            task = %task,
            exit_code = ?result.exit_code,
            duration_ms = result.duration_ms,
            "Task finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::task_executor::mocks::{MockBehavior, MockTaskExecutor};

    #[tokio::test]
    async fn test_runs_task_invocation() {
        let executor = Arc::new(MockTaskExecutor::new_success());
        let runner = TaskRunner::new(executor.clone());

        let result = runner.run(Task::Format, &[]).await.unwrap();

        assert_eq!(result.shell_exit_code(), 0);
        assert_eq!(executor.calls(), vec![Task::Format.invocation(&[])]);
    }

    #[tokio::test]
    async fn test_exit_code_propagates() {
        let runner = TaskRunner::new(Arc::new(MockTaskExecutor::new(MockBehavior::Exit(101))));
        let result = runner.run(Task::Test, &[]).await.unwrap();
        assert_eq!(result.shell_exit_code(), 101);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let runner = TaskRunner::new(Arc::new(MockTaskExecutor::new_fail("cargo not found")));
        assert!(matches!(
            runner.run(Task::Sync, &[]).await,
            Err(ExecutionError::SpawnFailed(_))
        ));
    }
}
