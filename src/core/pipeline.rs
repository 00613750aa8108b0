//! Pipeline domain model

use crate::core::step::{RunPolicy, Step};
use serde::Serialize;

/// An ordered list of steps, run strictly one after another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    steps: Vec<Step>,
}

/// Printable view of a step for `plan`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDescription {
    pub index: usize,
    pub label: String,
    pub command: String,
    pub policy: RunPolicy,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get a step by label
    pub fn step(&self, label: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn describe(&self) -> Vec<StepDescription> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, s)| StepDescription {
                index: i + 1,
                label: s.label.clone(),
                command: s.command.to_string(),
                policy: s.policy.clone(),
            })
            .collect()
    }
}
