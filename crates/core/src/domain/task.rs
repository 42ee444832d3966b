// Developer tasks dispatched to external tools

use serde::{Deserialize, Serialize};

/// Named pass-through task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Fetch/update dependencies
    Sync,
    /// Run the test suite quietly
    Test,
    /// Reformat the source tree
    Format,
    /// Run tests with coverage instrumentation
    Coverage,
}

impl Task {
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::Sync => "sync",
            Task::Test => "test",
            Task::Format => "format",
            Task::Coverage => "coverage",
        }
    }

    /// External command for this task, with `extra_args` appended
    pub fn invocation(&self, extra_args: &[String]) -> ToolInvocation {
        let (program, args): (&str, &[&str]) = match self {
            Task::Sync => ("cargo", &["fetch"][..]),
            Task::Test => ("cargo", &["test", "--workspace", "--quiet"][..]),
            Task::Format => ("cargo", &["fmt", "--all"][..]),
            Task::Coverage => ("cargo", &["llvm-cov", "--workspace"][..]),
        };

        ToolInvocation {
            program: program.to_string(),
            args: args
                .iter()
                .map(|a| a.to_string())
                .chain(extra_args.iter().cloned())
                .collect(),
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Program plus arguments, run with inherited stdio
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl std::fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
