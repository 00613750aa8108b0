//! Direct commit-and-push
//!
//! Commits the working tree and pushes it to a branch that tracks the
//! build directory directly.

use crate::core::config::DeployConfig;
use crate::core::Pipeline;
use crate::runner::CommandSpec;
use crate::workflow::{add_step, commit_step, push_step};

/// Build the direct-push pipeline for a configuration
pub fn pipeline(config: &DeployConfig) -> Pipeline {
    let push = &config.direct_push;
    let git = CommandSpec::new(&config.git);

    let push_command = match (&push.branch, push.subtree) {
        (Some(branch), true) => git.args([
            "subtree",
            "push",
            "--prefix",
            config.build_dir.as_str(),
            config.remote.as_str(),
            branch.as_str(),
        ]),
        (Some(branch), false) => git.args(["push", config.remote.as_str(), branch.as_str()]),
        (None, _) => git.arg("push"),
    };

    Pipeline::new(&config.name)
        .with_step(add_step(config))
        .with_step(commit_step(config))
        .with_step(push_step(push_command))
}
