//! Test: Sequencing - ordering, short-circuit and dynamic arguments

use crate::helpers::*;
use chrono::Local;
use sitedeploy::core::config::Strategy;
use sitedeploy::core::{DeployError, FailureCause, Pipeline, PipelineStatus, Step};
use sitedeploy::execution::DeployEngine;
use sitedeploy::runner::CommandSpec;
use std::sync::Arc;

fn numbered_pipeline(n: usize) -> Pipeline {
    (1..=n).fold(Pipeline::new("numbered"), |pipeline, i| {
        pipeline.with_step(Step::new(
            format!("step-{}", i),
            CommandSpec::new("git").arg(format!("op{}", i)),
            format!("Failed step {}.", i),
        ))
    })
}

#[tokio::test]
async fn test_all_steps_run_once_in_order() {
    let executor = Arc::new(MockExecutor::new());
    let engine = DeployEngine::new(executor.clone());

    let report = engine.execute(&numbered_pipeline(5)).await.unwrap();

    assert_eq!(report.status, PipelineStatus::Succeeded);
    assert_subcommands(&executor, &["op1", "op2", "op3", "op4", "op5"]);
}

#[tokio::test]
async fn test_kth_failure_stops_remaining_steps() {
    for k in 0..5 {
        let executor = Arc::new(MockExecutor::new().fail_call(k));
        let engine = DeployEngine::new(executor.clone());

        let failure = engine.execute(&numbered_pipeline(5)).await.unwrap_err();

        assert_eq!(failure.step, format!("step-{}", k + 1));
        assert_eq!(failure.message, format!("Failed step {}.", k + 1));
        assert_eq!(executor.calls().len(), k + 1, "k = {}", k);
    }
}

#[tokio::test]
async fn test_same_pipeline_runs_identically_twice() {
    let pipeline = numbered_pipeline(3);
    let executor = Arc::new(MockExecutor::new());
    let engine = DeployEngine::new(executor.clone());

    engine.execute(&pipeline).await.unwrap();
    engine.execute(&pipeline).await.unwrap();

    let lines = executor.command_lines();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[..3], lines[3..]);
}

#[tokio::test]
async fn test_missing_git_binary_becomes_step_failure() {
    let mut fixture = site_fixture(Strategy::DirectPush);
    fixture.config.git = "git-does-not-exist".to_string();
    let executor = Arc::new(MockExecutor::new().unspawnable("add"));

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert_failed_with(&result, "Failed to add all.");
    match &result.result {
        Err(DeployError::Step(failure)) => {
            assert!(matches!(failure.cause, FailureCause::Spawn { .. }));
            assert_eq!(failure.exit_code(), None);
        }
        other => panic!("Expected step failure, got {:?}", other.as_ref().map(|_| ())),
    }
    assert_eq!(executor.calls().len(), 1);
    assert_eq!(executor.calls()[0].program, "git-does-not-exist");
}

#[tokio::test]
async fn test_commit_message_is_wall_clock_at_invocation() {
    let fixture = site_fixture(Strategy::DirectPush);
    let executor = Arc::new(MockExecutor::new());

    let before = Local::now().format("%Y-%m-%d %-H:%M:%S").to_string();
    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;
    let after = Local::now().format("%Y-%m-%d %-H:%M:%S").to_string();

    assert!(result.is_success());
    let commit = &executor.calls()[1];
    assert_eq!(commit.args[..2], ["commit", "-m"]);
    assert!(
        commit.args[2] == before || commit.args[2] == after,
        "message '{}' not between '{}' and '{}'",
        commit.args[2],
        before,
        after
    );
}

#[tokio::test]
async fn test_missing_build_output_invokes_nothing() {
    let fixture = site_fixture(Strategy::DirectPush);
    std::fs::remove_dir_all(fixture.dir.path().join("dist")).unwrap();
    let executor = Arc::new(MockExecutor::new());

    let result = run_deploy_with_mock(&fixture.config, executor.clone()).await;

    assert!(matches!(
        result.result,
        Err(DeployError::BuildOutputMissing(_))
    ));
    assert_eq!(result.record().unwrap().code, 500);
    assert!(executor.calls().is_empty());
    assert!(result.events.is_empty());
    assert!(result.final_line().starts_with(r#"Error: {"ok":false,"code":500,"message":"build output directory "#));
}
