//! Pipeline execution engine

pub mod engine;
pub mod executor;

pub use engine::{DeployEngine, EventHandler, ExecutionEvent};
pub use executor::{ExecutionResult, StepExecutor};
