//! Main execution engine - runs a pipeline's steps in order

use crate::{
    core::{Pipeline, PipelineRun, PipelineStatus, RunReport, Step, StepFailure},
    execution::{ExecutionResult, StepExecutor},
    runner::{CommandExecutor, OutputCallback, OutputLine},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        label: String,
        /// 1-based position in the pipeline
        index: usize,
        total: usize,
        command: String,
    },
    StepOutput {
        label: String,
        line: OutputLine,
    },
    StepCompleted {
        label: String,
        duration: Duration,
    },
    StepFailed {
        label: String,
        failure: StepFailure,
    },
    StepSkipped {
        label: String,
        reason: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: PipelineStatus,
        duration: Duration,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Sequential pipeline engine
///
/// Steps run one at a time in declared order. The first failure stops
/// every remaining step except cleanup steps whose target was created.
/// Completed steps are never rolled back.
pub struct DeployEngine<E> {
    executor: StepExecutor<E>,
    event_handlers: Vec<EventHandler>,
}

/// Forwards a step's output lines to the event handlers
struct OutputForwarder<'a> {
    label: &'a str,
    handlers: &'a [EventHandler],
}

impl OutputCallback for OutputForwarder<'_> {
    fn on_line(&self, line: &OutputLine) {
        let event = ExecutionEvent::StepOutput {
            label: self.label.to_string(),
            line: line.clone(),
        };
        for handler in self.handlers {
            handler(event.clone());
        }
    }
}

impl<E: CommandExecutor> DeployEngine<E> {
    pub fn new(runner: E) -> Self {
        Self {
            executor: StepExecutor::new(runner),
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.add_event_handler(handler);
        self
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the entire pipeline
    ///
    /// Returns the run summary when every executed step succeeded, or the
    /// first step failure otherwise.
    pub async fn execute(&self, pipeline: &Pipeline) -> Result<RunReport, StepFailure> {
        let mut run = PipelineRun::new(pipeline);
        let run_id = run.run_id;
        let total = pipeline.len();

        info!("Starting pipeline: {} ({})", pipeline.name, run_id);
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name: pipeline.name.clone(),
            total_steps: total,
        });
        run.start();

        let mut first_failure: Option<StepFailure> = None;

        for (index, step) in pipeline.steps().iter().enumerate() {
            if let Some(failure) = &first_failure {
                if !step.runs_after_failure(|label| run.is_completed(label)) {
                    let reason = format!("step '{}' failed", failure.step);
                    run.step_skipped(index, reason.clone());
                    self.emit_event(ExecutionEvent::StepSkipped {
                        label: step.label.clone(),
                        reason,
                    });
                    continue;
                }
                info!("Running cleanup step {} after failure", step.label);
            }

            if let Err(failure) = self.execute_step(&mut run, index, total, step).await {
                if first_failure.is_none() {
                    first_failure = Some(failure);
                } else {
                    warn!("Cleanup step {} also failed: {}", step.label, failure.detail());
                }
            }
        }

        match first_failure {
            Some(failure) => {
                run.fail();
                error!("Pipeline {} failed: {}", pipeline.name, failure.detail());
                self.emit_event(ExecutionEvent::PipelineCompleted {
                    run_id,
                    status: PipelineStatus::Failed,
                    duration: run.duration(),
                });
                Err(failure)
            }
            None => {
                run.succeed();
                info!("Pipeline {} finished in {:?}", pipeline.name, run.duration());
                self.emit_event(ExecutionEvent::PipelineCompleted {
                    run_id,
                    status: PipelineStatus::Succeeded,
                    duration: run.duration(),
                });
                Ok(run.into_report())
            }
        }
    }

    /// Execute a single step and record its result in the run
    async fn execute_step(
        &self,
        run: &mut PipelineRun,
        index: usize,
        total: usize,
        step: &Step,
    ) -> Result<(), StepFailure> {
        let forwarder = OutputForwarder {
            label: &step.label,
            handlers: &self.event_handlers,
        };

        let command = self.executor.resolve(step);
        self.emit_event(ExecutionEvent::StepStarted {
            label: step.label.clone(),
            index: index + 1,
            total,
            command: command.to_string(),
        });
        run.step_started(index, command.to_string());

        match self.executor.run(step, command, Some(&forwarder)).await {
            ExecutionResult::Success { outcome, .. } => {
                run.step_completed(index, &outcome);
                self.emit_event(ExecutionEvent::StepCompleted {
                    label: step.label.clone(),
                    duration: outcome.duration,
                });
                Ok(())
            }
            ExecutionResult::Failed { failure, .. } => {
                run.step_failed(index, &failure);
                self.emit_event(ExecutionEvent::StepFailed {
                    label: step.label.clone(),
                    failure: failure.clone(),
                });
                Err(failure)
            }
        }
    }
}
