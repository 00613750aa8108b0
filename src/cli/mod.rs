//! Command-line interface

pub mod commands;
pub mod output;
pub mod terminal_output;

use clap::{Parser, Subcommand};
use commands::{DeployCommand, PlanCommand, ValidateCommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Publish a static site build to a git branch
#[derive(Debug, Parser, Clone)]
#[command(name = "sitedeploy")]
#[command(version)]
#[command(about = "Publish a static site build to a git branch", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the deploy configuration file (defaults to ./deploy.yaml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the deploy pipeline
    Deploy(DeployCommand),

    /// Print the commands a deploy would run
    Plan(PlanCommand),

    /// Validate a deploy configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
