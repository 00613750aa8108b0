//! Failure model for deployment steps

use crate::core::Step;
use crate::runner::{ExecutionOutcome, RunnerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Protocol-level status reported for every step failure
pub const FAILURE_CODE: u16 = 500;

/// Why a step failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureCause {
    /// The process ran and exited non-zero (or was killed: `None`)
    ExitStatus { exit_code: Option<i32> },
    /// The process could not be started
    Spawn { reason: String },
}

/// A step whose command did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct StepFailure {
    /// Label of the failing step
    pub step: String,

    /// Fixed, human-readable description of the failed operation
    pub message: String,

    /// Protocol status, always [`FAILURE_CODE`]
    pub code: u16,

    pub cause: FailureCause,

    /// Captured standard error of the failed process
    pub stderr: String,
}

impl StepFailure {
    /// Failure for a process that ran but did not exit zero
    pub fn from_outcome(step: &Step, outcome: &ExecutionOutcome) -> Self {
        Self {
            step: step.label.clone(),
            message: step.failure_message.clone(),
            code: FAILURE_CODE,
            cause: FailureCause::ExitStatus {
                exit_code: outcome.exit_code,
            },
            stderr: outcome.stderr.clone(),
        }
    }

    /// Failure for a process that never ran
    pub fn from_runner_error(step: &Step, error: &RunnerError) -> Self {
        Self {
            step: step.label.clone(),
            message: step.failure_message.clone(),
            code: FAILURE_CODE,
            cause: FailureCause::Spawn {
                reason: error.to_string(),
            },
            stderr: String::new(),
        }
    }

    /// Exit code of the failed process, if it ran and exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self.cause {
            FailureCause::ExitStatus { exit_code } => exit_code,
            FailureCause::Spawn { .. } => None,
        }
    }

    /// The `{ ok, code, message }` record shown to the operator
    pub fn record(&self) -> FailureRecord {
        FailureRecord::new(self.code, self.message.clone())
    }

    /// One-line diagnostic including step, cause and the last stderr line
    pub fn detail(&self) -> String {
        let cause = match &self.cause {
            FailureCause::ExitStatus { exit_code: Some(code) } => format!("exit code {}", code),
            FailureCause::ExitStatus { exit_code: None } => "terminated by signal".to_string(),
            FailureCause::Spawn { reason } => reason.clone(),
        };
        match self.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
            Some(last) => format!("step '{}' failed ({}): {}", self.step, cause, last.trim()),
            None => format!("step '{}' failed ({})", self.step, cause),
        }
    }
}

/// Structured error record: `{ ok: false, code, message }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub ok: bool,
    pub code: u16,
    pub message: String,
}

impl FailureRecord {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

/// Errors from a full deploy: pre-flight or pipeline
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("build output directory {} is missing or empty", .0.display())]
    BuildOutputMissing(PathBuf),

    #[error(transparent)]
    Step(#[from] StepFailure),
}

impl DeployError {
    pub fn record(&self) -> FailureRecord {
        match self {
            DeployError::Step(failure) => failure.record(),
            other => FailureRecord::new(FAILURE_CODE, other.to_string()),
        }
    }
}
