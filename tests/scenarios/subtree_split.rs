//! Test: Subtree split - publish the build directory over gh-pages

use crate::helpers::*;
use sitedeploy::core::config::{CleanupPolicy, Strategy};
use sitedeploy::core::StepState;
use std::sync::Arc;

#[tokio::test]
async fn test_subtree_split_success_deletes_temp_branch() {
    let fixture = site_fixture(Strategy::SubtreeSplit);
    let executor = Arc::new(MockExecutor::new());

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert!(result.is_success());
    assert_eq!(
        executor.command_lines(),
        vec![
            "git checkout master",
            "git subtree split --prefix dist -b gh-pages-deploy",
            "git push -f origin gh-pages-deploy:gh-pages",
            "git branch -D gh-pages-deploy",
        ]
    );
}

#[tokio::test]
async fn test_checkout_failure_runs_nothing_else() {
    let fixture = site_fixture(Strategy::SubtreeSplit);
    let executor = Arc::new(MockExecutor::new().exit_code("checkout", 1));

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert_failed_with(&result, "Failed to checkout source branch.");
    assert_subcommands(&executor, &["checkout"]);
    assert_eq!(
        result.skipped_steps(),
        vec!["subtree-split", "push", "delete-temp-branch"]
    );
}

#[tokio::test]
async fn test_split_failure_has_nothing_to_clean_up() {
    let fixture = site_fixture(Strategy::SubtreeSplit);
    let executor = Arc::new(MockExecutor::new().exit_code("subtree", 1));

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert_failed_with(&result, "Failed to split subtree.");
    assert_subcommands(&executor, &["checkout", "subtree"]);
}

#[tokio::test]
async fn test_push_failure_still_deletes_temp_branch() {
    let fixture = site_fixture(Strategy::SubtreeSplit);
    let executor = Arc::new(MockExecutor::new().exit_code("push", 1));

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    // The push failure is the reported error even though cleanup ran
    assert_failed_with(&result, "Failed push changes.");
    assert_subcommands(&executor, &["checkout", "subtree", "push", "branch"]);
}

#[tokio::test]
async fn test_push_failure_keeps_temp_branch_when_cleanup_on_success() {
    let mut fixture = site_fixture(Strategy::SubtreeSplit);
    fixture.config.subtree_split.cleanup = CleanupPolicy::OnSuccess;
    let executor = Arc::new(MockExecutor::new().exit_code("push", 1));

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert_failed_with(&result, "Failed push changes.");
    assert_subcommands(&executor, &["checkout", "subtree", "push"]);
    assert_eq!(result.skipped_steps(), vec!["delete-temp-branch"]);
}

#[tokio::test]
async fn test_failed_cleanup_after_success_fails_deploy() {
    let fixture = site_fixture(Strategy::SubtreeSplit);
    let executor = Arc::new(MockExecutor::new().exit_code("branch", 1));

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert_failed_with(&result, "Failed to delete temporary branch.");
}

#[tokio::test]
async fn test_commit_build_adds_and_commits_first() {
    let mut fixture = site_fixture(Strategy::SubtreeSplit);
    fixture.config.subtree_split.commit_build = true;
    let executor = Arc::new(MockExecutor::new());

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert!(result.is_success());
    assert_subcommands(
        &executor,
        &["checkout", "add", "commit", "subtree", "push", "branch"],
    );

    let report = result.result.unwrap();
    assert!(report
        .steps
        .iter()
        .all(|r| matches!(r.state, StepState::Completed { .. })));
}
