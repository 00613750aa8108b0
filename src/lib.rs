//! sitedeploy - publishes a static site build to a git branch

pub mod cli;
pub mod core;
pub mod execution;
pub mod runner;
pub mod workflow;

// Re-export commonly used types
pub use core::config::{CleanupPolicy, DeployConfig, Strategy};
pub use core::{DeployError, FailureRecord, Pipeline, RunReport, Step, StepFailure};
pub use execution::{DeployEngine, ExecutionEvent};
pub use runner::{CommandExecutor, CommandSpec, ExecutionOutcome, SubprocessRunner};
