//! Deploy workflows - concrete step orderings for each publishing strategy

pub mod direct_push;
pub mod subtree_split;

use crate::core::config::{DeployConfig, Strategy};
use crate::core::{DeployError, Pipeline, RunReport, Step};
use crate::execution::DeployEngine;
use crate::runner::{CommandExecutor, CommandSpec};
use std::path::Path;
use tracing::{info, warn};

pub const ADD: &str = "add";
pub const COMMIT: &str = "commit";
pub const PUSH: &str = "push";

/// `git add .`
pub(crate) fn add_step(config: &DeployConfig) -> Step {
    Step::new(
        ADD,
        CommandSpec::new(&config.git).args(["add", "."]),
        "Failed to add all.",
    )
}

/// `git commit -m <timestamp>`, the message rendered when the step runs
pub(crate) fn commit_step(config: &DeployConfig) -> Step {
    Step::new(
        COMMIT,
        CommandSpec::new(&config.git)
            .args(["commit", "-m"])
            .timestamp_arg(&config.commit_message_format),
        "Failed to commit.",
    )
}

pub(crate) fn push_step(command: CommandSpec) -> Step {
    Step::new(PUSH, command, "Failed push changes.")
}

/// Build the pipeline for the configured strategy
pub fn build_pipeline(config: &DeployConfig) -> Pipeline {
    match config.strategy {
        Strategy::SubtreeSplit => subtree_split::pipeline(config),
        Strategy::DirectPush => direct_push::pipeline(config),
    }
}

/// Check that the build produced something to publish
pub fn preflight(config: &DeployConfig) -> Result<(), DeployError> {
    let build_path = config.build_path();
    if !is_non_empty_dir(&build_path) {
        warn!("Build output {} is missing or empty", build_path.display());
        return Err(DeployError::BuildOutputMissing(build_path));
    }
    Ok(())
}

fn is_non_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Run the pre-flight check and then the configured pipeline
pub async fn deploy<E: CommandExecutor>(
    engine: &DeployEngine<E>,
    config: &DeployConfig,
) -> Result<RunReport, DeployError> {
    preflight(config)?;

    let pipeline = build_pipeline(config);
    info!(
        "Deploying {} with {:?} strategy: {}",
        config.build_dir,
        config.strategy,
        pipeline.labels().join(", ")
    );

    Ok(engine.execute(&pipeline).await?)
}
