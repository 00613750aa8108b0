//! Runner result types

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error types for command execution
///
/// A non-zero exit is not an error here; it is reported through
/// [`ExecutionOutcome::exit_code`].
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of running one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Process exit code (`None` when terminated by a signal)
    pub exit_code: Option<i32>,

    /// Everything the process wrote to standard output
    pub stdout: String,

    /// Everything the process wrote to standard error
    pub stderr: String,

    /// Wall time from spawn to exit
    pub duration: Duration,
}

impl ExecutionOutcome {
    pub fn new(exit_code: Option<i32>, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration: Duration::ZERO,
        }
    }

    /// Outcome of a process that exited with status 0 and printed nothing
    pub fn success() -> Self {
        Self::new(Some(0), String::new(), String::new())
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
