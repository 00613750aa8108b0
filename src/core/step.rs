//! Step domain model

use crate::runner::CommandSpec;
use serde::{Deserialize, Serialize};

/// A single named command in a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unique step label, e.g. `push`
    pub label: String,

    /// The command to run
    pub command: CommandSpec,

    /// Fixed message reported when the command fails
    pub failure_message: String,

    /// When this step is allowed to run
    pub policy: RunPolicy,
}

/// When a step runs relative to earlier failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum RunPolicy {
    /// Only while every earlier step has succeeded
    OnSuccess,
    /// Also after a failure, provided the step labelled `after` completed
    Cleanup { after: String },
}

impl Step {
    pub fn new(
        label: impl Into<String>,
        command: CommandSpec,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            command,
            failure_message: failure_message.into(),
            policy: RunPolicy::OnSuccess,
        }
    }

    /// Turn this step into a cleanup step for whatever `after` created
    pub fn cleanup_after(mut self, after: impl Into<String>) -> Self {
        self.policy = RunPolicy::Cleanup {
            after: after.into(),
        };
        self
    }

    /// Whether the step may still run once the pipeline has failed
    ///
    /// `completed` reports whether a given earlier step succeeded.
    pub fn runs_after_failure(&self, completed: impl Fn(&str) -> bool) -> bool {
        match &self.policy {
            RunPolicy::OnSuccess => false,
            RunPolicy::Cleanup { after } => completed(after),
        }
    }
}
