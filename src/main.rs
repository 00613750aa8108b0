use anyhow::{Context, Result};
use sitedeploy::cli::commands::{apply_overrides, DeployCommand, PlanCommand, ValidateCommand};
use sitedeploy::cli::output::*;
use sitedeploy::cli::terminal_output::TerminalReporter;
use sitedeploy::cli::{Cli, Command};
use sitedeploy::core::config::DeployConfig;
use sitedeploy::execution::DeployEngine;
use sitedeploy::runner::SubprocessRunner;
use sitedeploy::workflow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Config file picked up from the current directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "deploy.yaml";

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::from_args();

    // Logs go to stderr; stdout carries git output and the final result line
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    let installed = match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish()),
        Err(_) => tracing::subscriber::set_global_default(builder.with_max_level(log_level).finish()),
    };
    installed.context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Deploy(cmd) => run_deploy(cmd, cli.config.as_deref()).await,
        Command::Plan(cmd) => show_plan(cmd, cli.config.as_deref()),
        Command::Validate(cmd) => validate_config(cmd, cli.config.as_deref()),
    }
}

/// Load the config file, falling back to `deploy.yaml` and then to defaults
fn load_config(path: Option<&Path>) -> Result<DeployConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            debug!("Loading deploy config from {}", path.display());
            DeployConfig::from_file(&path)
                .with_context(|| format!("Failed to load deploy config {}", path.display()))
        }
        None => {
            debug!("No deploy config found, using defaults");
            Ok(DeployConfig::default())
        }
    }
}

async fn run_deploy(cmd: &DeployCommand, config_path: Option<&Path>) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, cmd.strategy, cmd.working_dir.clone());
    config.validate().context("Invalid deploy configuration")?;

    if cmd.dry_run {
        let pipeline = workflow::build_pipeline(&config);
        print!("{}", format_plan(&pipeline.name, &pipeline.describe()));
        return Ok(ExitCode::SUCCESS);
    }

    let mut runner = SubprocessRunner::new();
    if let Some(dir) = &config.working_dir {
        runner = runner.with_working_dir(dir);
    }

    let reporter = Arc::new(TerminalReporter::new(!cmd.no_progress));
    let handler = reporter.clone();
    let engine = DeployEngine::new(runner).with_event_handler(move |event| handler.on_event(&event));

    let result = workflow::deploy(&engine, &config).await;
    reporter.finish(&result);

    match result {
        Ok(report) => {
            debug!("Run {} finished: {:?}", report.run_id, report.executed_steps());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn show_plan(cmd: &PlanCommand, config_path: Option<&Path>) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, cmd.strategy, None);
    config.validate().context("Invalid deploy configuration")?;

    let pipeline = workflow::build_pipeline(&config);
    if cmd.json {
        let data = serde_json::json!({
            "name": pipeline.name,
            "strategy": config.strategy,
            "steps": pipeline.describe(),
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
    } else {
        print!("{}", format_plan(&pipeline.name, &pipeline.describe()));
    }

    Ok(ExitCode::SUCCESS)
}

fn validate_config(cmd: &ValidateCommand, config_path: Option<&Path>) -> Result<ExitCode> {
    println!("{} Validating deploy configuration...", INFO);

    match load_config(config_path) {
        Ok(config) => {
            println!("{} Deploy configuration is valid!", CHECK);
            println!("  Name: {}", style(&config.name).bold());
            println!("  Strategy: {}", style(format!("{:?}", config.strategy)).cyan());
            println!("  Build dir: {}", style(config.build_path().display()).cyan());
            println!("  Remote: {}", style(&config.remote).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            Ok(ExitCode::FAILURE)
        }
    }
}
