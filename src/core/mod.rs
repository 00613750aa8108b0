//! Core domain models for the deploy pipeline
//!
//! This module defines the steps, pipelines, run state and failure
//! records that the execution engine works with.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod step;

pub use error::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
