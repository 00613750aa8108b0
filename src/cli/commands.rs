//! CLI command definitions

use crate::core::config::{DeployConfig, Strategy};
use clap::Args;
use std::path::PathBuf;

/// Run the deploy pipeline
#[derive(Debug, Args, Clone)]
pub struct DeployCommand {
    /// Publishing strategy (overrides the config file)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Repository root (overrides the config file)
    #[arg(short = 'C', long)]
    pub working_dir: Option<PathBuf>,

    /// Print the commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Print the commands a deploy would run
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Publishing strategy (overrides the config file)
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate a deploy configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output the resolved configuration in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Publishing strategy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    SubtreeSplit,
    DirectPush,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::SubtreeSplit => Strategy::SubtreeSplit,
            StrategyArg::DirectPush => Strategy::DirectPush,
        }
    }
}

/// Apply command-line overrides on top of a loaded config
pub fn apply_overrides(
    config: &mut DeployConfig,
    strategy: Option<StrategyArg>,
    working_dir: Option<PathBuf>,
) {
    if let Some(strategy) = strategy {
        config.strategy = strategy.into();
    }
    if let Some(dir) = working_dir {
        config.working_dir = Some(dir);
    }
}
