//! Step executor - runs a single step through the command runner

use crate::{
    core::{Step, StepFailure},
    runner::{CommandExecutor, ExecutionOutcome, OutputCallback, ResolvedCommand},
};
use chrono::Local;
use tracing::{debug, error, info, warn};

/// Result of executing a step
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// Command exited zero
    Success {
        command: ResolvedCommand,
        outcome: ExecutionOutcome,
    },
    /// Command exited non-zero or could not be spawned
    Failed {
        command: ResolvedCommand,
        failure: StepFailure,
    },
}

/// Executes a single step
pub struct StepExecutor<E> {
    runner: E,
}

impl<E: CommandExecutor> StepExecutor<E> {
    pub fn new(runner: E) -> Self {
        Self { runner }
    }

    /// Resolve the step's arguments against the current time and run it
    pub async fn execute(
        &self,
        step: &Step,
        callback: Option<&dyn OutputCallback>,
    ) -> ExecutionResult {
        let command = self.resolve(step);
        self.run(step, command, callback).await
    }

    /// Render dynamic arguments (the commit timestamp) from the clock now
    pub fn resolve(&self, step: &Step) -> ResolvedCommand {
        step.command.resolve(&Local::now())
    }

    /// Run an already-resolved command on behalf of `step`
    pub async fn run(
        &self,
        step: &Step,
        command: ResolvedCommand,
        callback: Option<&dyn OutputCallback>,
    ) -> ExecutionResult {
        info!("Executing step {}: {}", step.label, command);

        match self.runner.run(&command, callback).await {
            Ok(outcome) if outcome.is_success() => {
                debug!("Step {} finished in {:?}", step.label, outcome.duration);
                ExecutionResult::Success { command, outcome }
            }
            Ok(outcome) => {
                warn!(
                    "Step {} exited with {:?}: {}",
                    step.label,
                    outcome.exit_code,
                    outcome.stderr.trim()
                );
                ExecutionResult::Failed {
                    failure: StepFailure::from_outcome(step, &outcome),
                    command,
                }
            }
            Err(e) => {
                error!("Could not run step {}: {}", step.label, e);
                ExecutionResult::Failed {
                    failure: StepFailure::from_runner_error(step, &e),
                    command,
                }
            }
        }
    }
}
