//! Subtree split & force-publish
//!
//! Slices the build directory's history out of the development branch into
//! a temporary branch, force-pushes that branch over the published branch,
//! then deletes it.

use crate::core::config::{CleanupPolicy, DeployConfig};
use crate::core::{Pipeline, Step};
use crate::runner::CommandSpec;
use crate::workflow::{add_step, commit_step, push_step};

pub const CHECKOUT: &str = "checkout";
pub const SPLIT: &str = "subtree-split";
pub const DELETE_TEMP_BRANCH: &str = "delete-temp-branch";

/// Build the subtree-split pipeline for a configuration
pub fn pipeline(config: &DeployConfig) -> Pipeline {
    let split = &config.subtree_split;
    let git = || CommandSpec::new(&config.git);

    let mut pipeline = Pipeline::new(&config.name).with_step(Step::new(
        CHECKOUT,
        git().args(["checkout", split.source_branch.as_str()]),
        "Failed to checkout source branch.",
    ));

    if split.commit_build {
        pipeline.push(add_step(config));
        pipeline.push(commit_step(config));
    }

    pipeline.push(Step::new(
        SPLIT,
        git().args([
            "subtree",
            "split",
            "--prefix",
            config.build_dir.as_str(),
            "-b",
            split.temp_branch.as_str(),
        ]),
        "Failed to split subtree.",
    ));

    pipeline.push(push_step(git().args([
        "push".to_string(),
        "-f".to_string(),
        config.remote.clone(),
        format!("{}:{}", split.temp_branch, split.published_branch),
    ])));

    let delete = Step::new(
        DELETE_TEMP_BRANCH,
        git().args(["branch", "-D", split.temp_branch.as_str()]),
        "Failed to delete temporary branch.",
    );
    pipeline.push(match split.cleanup {
        CleanupPolicy::Always => delete.cleanup_after(SPLIT),
        CleanupPolicy::OnSuccess => delete,
    });

    pipeline
}
