//! Execution state models

use crate::core::{Pipeline, StepFailure};
use crate::runner::ExecutionOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every step succeeded
    Succeeded,
    /// A step failed
    Failed,
}

/// State of a single step within one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StepState {
    /// Step has not been reached yet
    Pending,
    /// Step is currently running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Step exited zero
    Completed {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        duration: Duration,
    },
    /// Step failed to spawn or exited non-zero
    Failed {
        error: String,
        exit_code: Option<i32>,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Step was not run because an earlier step failed
    Skipped {
        reason: String,
    },
}

/// Per-step entry of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub label: String,
    /// The command as actually run (dynamic arguments resolved)
    pub command: Option<String>,
    pub state: StepState,
}

/// Transient state of one pipeline execution
///
/// Created when a deploy starts and dropped once it settles; only the
/// [`RunReport`] outlives it.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub status: PipelineStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    records: Vec<StepRecord>,
}

impl PipelineRun {
    pub fn new(pipeline: &Pipeline) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline_name: pipeline.name.clone(),
            status: PipelineStatus::Pending,
            started_at: None,
            completed_at: None,
            records: pipeline
                .steps()
                .iter()
                .map(|s| StepRecord {
                    label: s.label.clone(),
                    command: None,
                    state: StepState::Pending,
                })
                .collect(),
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self) {
        self.status = PipelineStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Mark pipeline as succeeded
    pub fn succeed(&mut self) {
        self.status = PipelineStatus::Succeeded;
        self.completed_at = Some(Utc::now());
    }

    /// Mark pipeline as failed
    pub fn fail(&mut self) {
        self.status = PipelineStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    pub fn step_started(&mut self, index: usize, command: String) {
        if let Some(record) = self.records.get_mut(index) {
            record.command = Some(command);
            record.state = StepState::Running {
                started_at: Utc::now(),
            };
        }
    }

    pub fn step_completed(&mut self, index: usize, outcome: &ExecutionOutcome) {
        if let Some(record) = self.records.get_mut(index) {
            let started_at = record.started_at().unwrap_or_else(Utc::now);
            record.state = StepState::Completed {
                started_at,
                completed_at: Utc::now(),
                duration: outcome.duration,
            };
        }
    }

    pub fn step_failed(&mut self, index: usize, failure: &StepFailure) {
        if let Some(record) = self.records.get_mut(index) {
            let started_at = record.started_at().unwrap_or_else(Utc::now);
            record.state = StepState::Failed {
                error: failure.message.clone(),
                exit_code: failure.exit_code(),
                started_at,
                failed_at: Utc::now(),
            };
        }
    }

    pub fn step_skipped(&mut self, index: usize, reason: impl Into<String>) {
        if let Some(record) = self.records.get_mut(index) {
            record.state = StepState::Skipped {
                reason: reason.into(),
            };
        }
    }

    /// Whether the step with this label exited zero during this run
    pub fn is_completed(&self, label: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.label == label && matches!(r.state, StepState::Completed { .. }))
    }

    pub fn duration(&self) -> Duration {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => end.signed_duration_since(start).to_std().unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }

    /// Summary that outlives the run
    pub fn into_report(self) -> RunReport {
        let duration = self.duration();
        RunReport {
            run_id: self.run_id,
            pipeline_name: self.pipeline_name,
            status: self.status,
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration,
            steps: self.records,
        }
    }
}

impl StepRecord {
    fn started_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            StepState::Running { started_at } => Some(*started_at),
            _ => None,
        }
    }
}

/// Summary of a finished pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub pipeline_name: String,
    pub status: PipelineStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: Duration,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    /// Labels of the steps that ran, in order
    pub fn executed_steps(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|r| matches!(r.state, StepState::Completed { .. } | StepState::Failed { .. }))
            .map(|r| r.label.as_str())
            .collect()
    }
}
